pub mod aggregate;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod resource;
pub mod samples;
pub mod settings;
pub mod store;
pub mod view;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use http_client::ApiClient;
pub use resource::{Deletable, Resource, Updatable};
pub use view::{DashboardView, ResourceView};
