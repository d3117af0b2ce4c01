//! CLI library components for the NPI comparability pipeline.

pub mod cli;
pub mod logging;
pub mod pipeline;
pub mod summary;
