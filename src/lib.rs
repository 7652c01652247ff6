pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod parser;
pub mod services;

pub use analyzers::analyzer::{Dataset, run_daily_quality};
pub use error::QualityError;
