//! Library crate for ssllabs-check: SSL Labs API client, assessment poller and report renderer.
pub mod check;
pub mod client;
pub mod error;
pub mod poller;
pub mod render;
pub mod types;

pub use check::{run_check, CheckEvent, CheckOptions, CheckReport};
pub use client::{AssessmentApi, ClientConfig, SslLabsClient};
pub use error::CheckError;
