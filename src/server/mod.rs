pub mod config;
mod error;
mod http_layers;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use services::Services;
