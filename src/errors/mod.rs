pub mod app_error;
pub mod engine_error;

pub use app_error::{AppError, AppResult};
pub use engine_error::EngineError;
