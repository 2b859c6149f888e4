/// Crawl lifecycle definitions
///
/// This module defines the phases a crawl run moves through.
use std::fmt;

/// Represents the current phase of a crawl run
///
/// A run starts `Running`, may bounce between `Running` and `Paused` any
/// number of times, and ends in exactly one of the terminal phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// The controller is fetching and recording links
    Running,

    /// The operator paused the run; no new fetch is issued
    Paused,

    /// The operator stopped the run before the frontier was exhausted
    Stopped,

    /// The frontier was exhausted or the URL limit was reached
    Done,
}

impl CrawlState {
    /// Returns true if the run ended because an operator asked it to
    pub fn was_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Short lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
