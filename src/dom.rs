//! Read-only queries over a parsed HTML snapshot: text cleaning, span
//! attributes, hyperlinks, table structure and element visibility.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

/// HTML caps `colspan` at 1000 and `rowspan` at 65534.
pub const MAX_COL_SPAN: usize = 1000;
pub const MAX_ROW_SPAN: usize = 65_534;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded whitespace regex is valid"));
static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x1F\x7F]").expect("hardcoded control character regex is valid")
});
static SCRIPT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*javascript:").expect("hardcoded script url regex is valid"));

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("hardcoded row selector is valid"));
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("hardcoded anchor selector is valid"));
static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("hardcoded table selector is valid"));

/// Strips control characters (newlines and tabs included), then collapses
/// whitespace runs to one space and trims.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let stripped = CONTROL_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Parses a span attribute the way browsers do: leading digits only,
/// zero or garbage becomes 1, large values are clamped to `max`.
#[must_use]
pub fn parse_span(raw: Option<&str>, max: usize) -> usize {
    let Some(raw) = raw else {
        return 1;
    };
    let digits = raw
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>();
    match digits.parse::<usize>() {
        Ok(0) | Err(_) => {
            if digits.is_empty() || digits.chars().all(|ch| ch == '0') {
                1
            } else {
                max
            }
        }
        Ok(value) => value.min(max),
    }
}

#[must_use]
pub fn col_span(cell: ElementRef<'_>) -> usize {
    parse_span(cell.value().attr("colspan"), MAX_COL_SPAN)
}

#[must_use]
pub fn row_span(cell: ElementRef<'_>) -> usize {
    parse_span(cell.value().attr("rowspan"), MAX_ROW_SPAN)
}

#[must_use]
pub fn is_script_url(href: &str) -> bool {
    SCRIPT_URL_RE.is_match(href)
}

/// The href of the cell's first `a[href]`, unless it is a script pseudo-URL.
#[must_use]
pub fn cell_href(cell: ElementRef<'_>) -> Option<String> {
    let anchor = cell.select(&ANCHOR_SELECTOR).next()?;
    let raw = anchor.value().attr("href")?;
    if raw.is_empty() || is_script_url(raw) {
        return None;
    }
    Some(raw.to_string())
}

#[must_use]
pub fn is_table(element: ElementRef<'_>) -> bool {
    element.value().name().eq_ignore_ascii_case("table")
}

#[must_use]
pub fn first_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.select(&TABLE_SELECTOR).next()
}

#[must_use]
pub fn tables(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element.select(&TABLE_SELECTOR).collect()
}

/// Nearest strict ancestor that is a `table`.
#[must_use]
pub fn enclosing_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| is_table(*ancestor))
}

/// Rows owned by `table` in document order; rows of nested tables are skipped.
#[must_use]
pub fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table
        .select(&ROW_SELECTOR)
        .filter(|row| enclosing_table(*row).is_some_and(|owner| owner.id() == table.id()))
        .collect()
}

/// Direct `th`/`td` children of a row.
#[must_use]
pub fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| matches!(child.value().name(), "td" | "th"))
        .collect()
}

#[must_use]
pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|candidate| candidate == class)
}

/// The element itself or its nearest ancestor carrying `class`.
#[must_use]
pub fn closest_with_class<'a>(element: ElementRef<'a>, class: &str) -> Option<ElementRef<'a>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|candidate| has_class(*candidate, class))
}

/// Style and layout query used to decide whether an element is shown.
pub trait VisibilityOracle {
    fn is_visible(&self, element: ElementRef<'_>) -> bool;
}

impl<F> VisibilityOracle for F
where
    F: Fn(ElementRef<'_>) -> bool,
{
    fn is_visible(&self, element: ElementRef<'_>) -> bool {
        self(element)
    }
}

/// Treats every element as visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeVisible;

impl VisibilityOracle for AssumeVisible {
    fn is_visible(&self, _element: ElementRef<'_>) -> bool {
        true
    }
}

/// Visibility from inline styles, the `hidden` attribute and hiding classes.
///
/// A static snapshot has no layout, so "participates in layout" is
/// approximated by the absence of `display: none`, `hidden` and `template`
/// anywhere on the ancestor chain.
#[derive(Debug, Clone)]
pub struct StyleOracle {
    hidden_classes: Vec<String>,
}

impl Default for StyleOracle {
    fn default() -> Self {
        Self {
            hidden_classes: vec!["is-hidden".to_string()],
        }
    }
}

impl StyleOracle {
    #[must_use]
    pub fn with_hidden_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hidden_classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    fn has_hidden_class(&self, element: ElementRef<'_>) -> bool {
        self.hidden_classes
            .iter()
            .any(|class| has_class(element, class))
    }
}

impl VisibilityOracle for StyleOracle {
    fn is_visible(&self, element: ElementRef<'_>) -> bool {
        if self.has_hidden_class(element) {
            return false;
        }

        let style = element.value().attr("style");
        if let Some(opacity) = style.and_then(|style| style_value(style, "opacity"))
            && opacity.parse::<f32>().is_ok_and(|value| value <= 0.0)
        {
            return false;
        }

        let mut visibility_resolved = false;
        for node in std::iter::once(element).chain(element.ancestors().filter_map(ElementRef::wrap))
        {
            let value = node.value();
            if value.attr("hidden").is_some() || value.name() == "template" {
                return false;
            }
            let Some(style) = value.attr("style") else {
                continue;
            };
            if style_value(style, "display").as_deref() == Some("none") {
                return false;
            }
            if !visibility_resolved && let Some(visibility) = style_value(style, "visibility") {
                if visibility == "hidden" || visibility == "collapse" {
                    return false;
                }
                visibility_resolved = true;
            }
        }

        true
    }
}

/// Last declared value of `property` in an inline style, lowercased and
/// without `!important`.
fn style_value(style: &str, property: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| {
            value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase()
        })
        .last()
}
