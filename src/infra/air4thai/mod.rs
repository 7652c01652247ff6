//! Client for the air4thai station history endpoint.

pub mod client;

pub use client::Air4ThaiClient;
