//! Daily air-quality aggregation and dashboard views.
//!
//! Raw readings are grouped by calendar day, each tracked parameter is
//! averaged, and the day's PM2.5 average is mapped to a quality label.

pub mod aggregate;
pub mod analyzer;
pub mod quality;
pub mod types;
pub mod utility;
pub mod view;
