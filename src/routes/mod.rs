//! Router construction

pub mod api;
pub mod ws;

pub use api::create_api_router;
pub use ws::create_ws_router;
