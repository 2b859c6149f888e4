//! Output module for saving crawl results and reports
//!
//! This module handles:
//! - Exporting discovered links in several formats
//! - Building and saving the site structure report
//! - Summarising crawl statistics

mod links;
pub mod stats;
mod structure;
mod traits;

pub use links::{save_links, CsvFormatter, JsonFormatter, LinksFormatter, TxtFormatter};
pub use stats::{print_statistics, CrawlStatistics};
pub use structure::{save_structure, SiteStructure};
pub use traits::{LinkFormatter, OutputError, OutputResult};

use serde::Deserialize;
use std::fmt;

/// Export format of the links file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One URL per line
    Txt,
    /// `url,value` per line
    Links,
    /// CSV with a header row
    #[default]
    Csv,
    /// JSON array of link records
    Json,
}

impl OutputFormat {
    /// Returns the formatter that renders this format
    pub fn formatter(&self) -> Box<dyn LinkFormatter> {
        match self {
            Self::Txt => Box::new(TxtFormatter),
            Self::Links => Box::new(LinksFormatter),
            Self::Csv => Box::new(CsvFormatter),
            Self::Json => Box::new(JsonFormatter),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.formatter().name())
    }
}
