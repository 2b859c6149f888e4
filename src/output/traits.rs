//! Output formatter traits and types
//!
//! This module defines the trait interface for link exporters and the
//! errors shared by every output path.

use crate::state::VisitedRegistry;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for turning a registry into the text of one export format
///
/// Implementations must keep the registry's discovery order.
pub trait LinkFormatter {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Renders the whole registry
    ///
    /// # Arguments
    ///
    /// * `registry` - The links to export
    fn format(&self, registry: &VisitedRegistry) -> OutputResult<String>;
}
