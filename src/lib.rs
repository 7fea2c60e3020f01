pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;

pub use crate::adapters::{http::ReqwestHttpClient, sink::LogSink, sink::StdoutSink};
pub use crate::app::{parse_command, FormEvent, FormSession};
pub use crate::config::AppConfig;
pub use crate::core::{debounce::Debouncer, fetch::Fetcher, form::FormController};
pub use crate::utils::error::{FormError, Result};
