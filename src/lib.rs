// Public module exports for binary crates
pub mod cli;
pub mod config;
pub mod crop;
pub mod error;
pub mod extract;
pub mod file_dialog;
pub mod geometry;
pub mod logging;
pub mod ocr;
pub mod render;
pub mod selection;
pub mod upscale;
pub mod workflow;

pub use config::RoiConfig;
pub use error::{RoiError, RoiResult};
pub use geometry::{PageRotation, PageSize, PdfRect, Region, UpscaleLayout};
pub use render::PageSource;
pub use workflow::{Cancellation, Frontend, Outcome, RunArgs};
