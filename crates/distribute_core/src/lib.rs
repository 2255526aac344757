pub mod config;
pub mod logging;

pub use config::{DistributeConfig, validate_url};
pub use logging::{init_logging, init_logging_to_dir};
