pub mod api_error;
pub mod control_ui;
pub mod feedback_api;
pub mod health_api;
pub mod server;
pub mod upload_api;

pub use server::{build_router, AppState};
