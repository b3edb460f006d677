//! Keyword matching and the offline skill catalog

pub mod catalog;
pub mod matcher;
