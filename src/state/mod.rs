//! State module for tracking crawl progress
//!
//! This module provides the state owned by a single crawl run.
//!
//! # Components
//!
//! - `CrawlState`: The lifecycle phase of a run (running, paused, stopped, done)
//! - `VisitedRegistry`: Every discovered link with its captured metadata
//! - `LinkMetadata` / `ResolvedAddress`: What was captured for one link

mod crawl_state;
mod registry;

// Re-export main types
pub use crawl_state::CrawlState;
pub use registry::{LinkMetadata, ResolvedAddress, VisitedRegistry, ADDRESS_NOT_FOUND};
