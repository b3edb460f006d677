//! Word template handling: package IO, section extraction and write-back

pub mod extractor;
pub mod model;
pub mod package;
pub mod writer;
