use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Drop columns in which no cell is visible.
    pub only_visible_columns: bool,
    /// Populate the link list; when false it stays empty.
    pub preserve_hyperlinks: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            only_visible_columns: true,
            preserve_hyperlinks: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported export format '{other}', expected xlsx or csv")),
        }
    }
}

pub const DEFAULT_BUTTON_COLOR: &str = "rgba(65, 117, 5, 1)";
pub const DEFAULT_ICON_COLOR: &str = "#FFFFFF";
pub const DEFAULT_BUTTON_SIZE: u32 = 20;

/// Persisted host settings. Keys missing from storage keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub excluded_urls: Vec<String>,
    pub button_color: String,
    pub icon_color: String,
    pub button_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            excluded_urls: Vec::new(),
            button_color: DEFAULT_BUTTON_COLOR.to_string(),
            icon_color: DEFAULT_ICON_COLOR.to_string(),
            button_size: DEFAULT_BUTTON_SIZE,
        }
    }
}

impl Settings {
    /// True when any non-empty excluded fragment occurs in `url`.
    #[must_use]
    pub fn is_excluded(&self, url: &str) -> bool {
        self.excluded_urls
            .iter()
            .map(|piece| piece.trim())
            .filter(|piece| !piece.is_empty())
            .any(|piece| url.contains(piece))
    }
}
