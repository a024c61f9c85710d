pub mod error;
pub mod model;
pub mod selector;

pub use error::AppError;
pub use model::{
    DownloadPhase, DownloadRequest, MediaType, PendingVideoChoice, ResolvedSelection,
    VideoResolution,
};
