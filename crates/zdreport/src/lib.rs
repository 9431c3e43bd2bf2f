//! Library side of the zdreport binary: the API client and terminal
//! rendering, exposed so integration tests can drive them directly.

pub mod client;
pub mod render;

pub use client::{ClientError, ZendeskClient};
