use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use crate::dom::{clean_text, element_text};
use crate::host::Localizer;
use crate::options::ExportFormat;

/// Worksheet names are limited to 31 characters.
pub const MAX_SHEET_NAME_CHARS: usize = 31;
pub const DEFAULT_SHEET_NAME_KEY: &str = "default_sheet_name";
pub const DEFAULT_SHEET_NAME: &str = "Table Data";

static SHEET_ILLEGAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\\/:*?\[\]]").expect("hardcoded sheet name regex is valid")
});
static EXPORT_ILLEGAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\\/:*?\[\]|"<>]"#).expect("hardcoded export name regex is valid")
});

#[must_use]
pub fn default_sheet_name(localizer: &dyn Localizer) -> String {
    localizer.text(DEFAULT_SHEET_NAME_KEY, DEFAULT_SHEET_NAME)
}

/// Sheet name for a table: `data-sheet-name`, else its caption, else the
/// document title, else the localized default.
#[must_use]
pub fn sheet_name_for(
    table: ElementRef<'_>,
    document_title: Option<&str>,
    localizer: &dyn Localizer,
) -> String {
    let raw = table
        .value()
        .attr("data-sheet-name")
        .map(str::to_string)
        .or_else(|| {
            table
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| child.value().name() == "caption")
                .map(element_text)
        })
        .or_else(|| document_title.map(str::to_string))
        .unwrap_or_else(|| default_sheet_name(localizer));

    let text = clean_text(&raw);
    let cleaned = SHEET_ILLEGAL_RE.replace_all(&text, "");
    truncated_or_default(&cleaned, localizer)
}

/// Name shared by the worksheet and the downloaded file.
#[must_use]
pub fn sanitize_export_name(raw: &str, localizer: &dyn Localizer) -> String {
    let text = clean_text(raw);
    let cleaned = EXPORT_ILLEGAL_RE.replace_all(&text, "");
    truncated_or_default(&cleaned, localizer)
}

#[must_use]
pub fn export_file_name(name: &str, format: ExportFormat) -> String {
    let suffix = format!(".{}", format.extension());
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

/// Worksheet names may not start or end with an apostrophe.
fn trim_name(name: &str) -> &str {
    name.trim_matches(|ch: char| ch == '\'' || ch.is_whitespace())
}

fn truncated_or_default(name: &str, localizer: &dyn Localizer) -> String {
    let truncated = trim_name(name)
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect::<String>();
    let truncated = trim_name(&truncated);
    if truncated.is_empty() {
        default_sheet_name(localizer)
    } else {
        truncated.to_string()
    }
}
