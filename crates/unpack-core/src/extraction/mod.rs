//! Entry-by-entry extraction driven by the format decoders.

pub mod engine;

pub use engine::ExtractionEngine;
