mod app;
mod config;
mod effects;
mod logging;
mod render;

pub use app::run_app;
pub use config::{load_config, CONFIG_FILENAME};
pub use logging::{initialize as initialize_logging, LogDestination};
