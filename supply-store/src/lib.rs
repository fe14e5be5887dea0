pub mod app_config;
pub mod registry;

pub use app_config::Config;
pub use registry::{Entity, EntityStore, Registry};
