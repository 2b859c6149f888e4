//! Site structure report
//!
//! Folds the paths of the recorded links into a tree of path segments and
//! renders it as an indented outline:
//!
//! ```text
//! - docs
//!     - guide
//!     - api
//! - blog
//! ```

use crate::output::traits::OutputResult;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

const INDENT: usize = 4;

/// Nested tree of URL path segments, children kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteStructure {
    children: Vec<(String, SiteStructure)>,
}

impl SiteStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tree from URL strings
    ///
    /// Only the path of each URL counts; host, query, and fragment are
    /// ignored, as are empty segments. Strings that do not parse as URLs are
    /// skipped.
    pub fn from_urls<'a, I>(urls: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut root = Self::new();
        for raw in urls {
            match Url::parse(raw) {
                Ok(url) => root.insert_path(url.path()),
                Err(e) => tracing::debug!("Leaving {} out of the structure: {}", raw, e),
            }
        }
        root
    }

    /// Adds one `/`-separated path to the tree
    pub fn insert_path(&mut self, path: &str) {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.child_mut(segment);
        }
    }

    fn child_mut(&mut self, segment: &str) -> &mut SiteStructure {
        let index = match self.children.iter().position(|(name, _)| name == segment) {
            Some(index) => index,
            None => {
                self.children.push((segment.to_string(), Self::new()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child segments of this node, in insertion order
    pub fn children(&self) -> impl Iterator<Item = (&str, &SiteStructure)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    fn write_level(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for (name, node) in &self.children {
            writeln!(f, "{:indent$}- {}", "", name, indent = indent)?;
            node.write_level(f, indent + INDENT)?;
        }
        Ok(())
    }
}

impl fmt::Display for SiteStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_level(f, 0)
    }
}

/// Writes the rendered structure to `output_path`
pub fn save_structure(structure: &SiteStructure, output_path: &Path) -> OutputResult<()> {
    let mut file = File::create(output_path)?;
    file.write_all(structure.to_string().as_bytes())?;
    tracing::info!("Saved site structure to {}", output_path.display());
    Ok(())
}
