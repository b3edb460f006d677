//! Tailoring a CV (and optionally a cover letter) to a job

pub mod batch;
pub mod cover_letter;
pub mod rewriter;
