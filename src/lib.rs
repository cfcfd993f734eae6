#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod returner;
pub mod sender;
pub mod state;
pub mod telemetry;
pub mod types;

pub type Result<T> = std::result::Result<T, error::Error>;
