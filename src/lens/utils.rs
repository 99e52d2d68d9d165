//! Output formatting shared by lens modules
//!
//! Every lens renders its results through [`OutputFormat`]: JSON variants
//! serialize the full records, table variants render display rows with `tabled`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Default maximum length for long text (titles, addresses) in tables
pub const DEFAULT_NAME_MAX_LEN: usize = 30;

/// Unified output format for all librarylook commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON array
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Check if this is a table variant
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table | Self::Markdown)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }

    /// Render a single serializable value (status reports, insert results)
    ///
    /// Table and PSV formats fall back to pretty JSON; callers that have a
    /// tabular view should use [`render_rows`] instead.
    pub fn render_value<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(match self {
            Self::Json | Self::JsonLine => serde_json::to_string(value)?,
            _ => serde_json::to_string_pretty(value)?,
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Render records in the requested format
///
/// `records` are serialized as-is for JSON formats; `rows` are their display
/// counterparts used for tables and PSV.
pub fn render_rows<R: Serialize, T: Tabled>(
    records: &[R],
    rows: &[T],
    format: &OutputFormat,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(records)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(records)?,
        OutputFormat::JsonLine => {
            let mut lines = Vec::with_capacity(records.len());
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            lines.join("\n")
        }
        OutputFormat::Table => Table::new(rows).with(Style::rounded()).to_string(),
        OutputFormat::Markdown => Table::new(rows).with(Style::markdown()).to_string(),
        OutputFormat::Psv => {
            let mut lines = vec![T::headers().join("|")];
            for row in rows {
                lines.push(row.fields().join("|"));
            }
            lines.join("\n")
        }
    })
}

/// Display an optional value, empty when absent
pub fn or_empty<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Truncate a string to the specified length, adding "..." if truncated
///
/// # Examples
///
/// ```
/// use librarylook::lens::utils::truncate_name;
///
/// assert_eq!(truncate_name("Dune", 20), "Dune");
/// assert_eq!(truncate_name("The Left Hand of Darkness", 20), "The Left Hand of ...");
/// ```
pub fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        let truncated: String = name.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
