//! Text-generation service integration

pub mod analyzer;
pub mod client;
pub mod prompts;
