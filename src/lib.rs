pub mod captioner;
pub mod config;
pub mod error;
pub mod image_upload;
pub mod models;
pub mod observability;
pub mod routes;
pub mod service;
pub mod translator;

pub use config::Settings;
pub use error::AppError;
pub use routes::{create_router, AppState};
pub use service::AltTextService;
