//! Link list exporters
//!
//! Every format writes the registry in discovery order.

use crate::output::traits::{LinkFormatter, OutputError, OutputResult};
use crate::output::OutputFormat;
use crate::state::VisitedRegistry;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One URL per line
#[derive(Debug, Clone, Copy, Default)]
pub struct TxtFormatter;

impl LinkFormatter for TxtFormatter {
    fn name(&self) -> &'static str {
        "txt"
    }

    fn format(&self, registry: &VisitedRegistry) -> OutputResult<String> {
        let mut out = String::new();
        for url in registry.urls() {
            out.push_str(url);
            out.push('\n');
        }
        Ok(out)
    }
}

/// `url,value` per line, where value is the link's most informative metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct LinksFormatter;

impl LinkFormatter for LinksFormatter {
    fn name(&self) -> &'static str {
        "links"
    }

    fn format(&self, registry: &VisitedRegistry) -> OutputResult<String> {
        let mut out = String::new();
        for (url, metadata) in registry.iter() {
            out.push_str(&format!("{},{}\n", url, metadata.primary_value()));
        }
        Ok(out)
    }
}

/// Two-column CSV with a header row
///
/// The second column is named `IP Address` when addresses were captured and
/// `Metadata` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormatter;

impl LinkFormatter for CsvFormatter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn format(&self, registry: &VisitedRegistry) -> OutputResult<String> {
        let column = if registry
            .iter()
            .any(|(_, metadata)| metadata.resolved_address.is_some())
        {
            "IP Address"
        } else {
            "Metadata"
        };

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(vec![]);

        writer.write_record(["URL", column])?;
        for (url, metadata) in registry.iter() {
            writer.write_record([url, metadata.primary_value().as_str()])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| OutputError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

#[derive(Debug, Serialize)]
struct LinkRecord<'a> {
    url: &'a str,
    depth: u32,
    status_code: Option<u16>,
    address: Option<String>,
}

/// Pretty-printed JSON array of link records
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl LinkFormatter for JsonFormatter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn format(&self, registry: &VisitedRegistry) -> OutputResult<String> {
        let records: Vec<LinkRecord<'_>> = registry
            .iter()
            .map(|(url, metadata)| LinkRecord {
                url,
                depth: metadata.discovered_at_depth,
                status_code: metadata.status_code,
                address: metadata.resolved_address.map(|a| a.to_string()),
            })
            .collect();

        let mut out = serde_json::to_string_pretty(&records)?;
        out.push('\n');
        Ok(out)
    }
}

/// Writes the registry to `output_path` in the given format
///
/// # Arguments
///
/// * `registry` - The links to save
/// * `format` - The export format
/// * `output_path` - Path of the file to create or truncate
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - Failed to format or write
pub fn save_links(
    registry: &VisitedRegistry,
    format: OutputFormat,
    output_path: &Path,
) -> OutputResult<()> {
    let formatter = format.formatter();
    let content = formatter.format(registry)?;

    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;

    tracing::info!(
        "Saved {} links as {} to {}",
        registry.len(),
        formatter.name(),
        output_path.display()
    );
    Ok(())
}
