//! CLI library components for the stroke registry normalizer.

pub mod logging;
pub mod pipeline;
