//! CV tailoring library

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;
pub mod tailor;

pub use config::Config;
pub use error::{Result, TailorError};
