pub mod aggregate;
pub mod config;
pub mod report;
pub mod types;

pub use aggregate::IncidentAggregator;
pub use config::{Auth, ConfigError, Credentials};
pub use report::write_report;
pub use types::*;
