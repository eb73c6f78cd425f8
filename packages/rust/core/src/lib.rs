//! Biography assembly for Chronicle.
//!
//! This crate ties the encyclopedia client, infobox extraction and text
//! normalization together into the end-to-end lookup workflow
//! ([`Pipeline::assemble`]), and owns classification and quality scoring.

pub mod assembler;
pub mod classify;
pub mod pipeline;
pub mod quality;

pub use assembler::{BiographyRecord, SourceMaterial, Transformed, transform};
pub use classify::{classify, period_for};
pub use pipeline::{Pipeline, PipelineStage, ProgressReporter, SilentProgress};
pub use quality::{Assessment, BiographyDraft, validate};
