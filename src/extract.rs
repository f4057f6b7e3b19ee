use scraper::ElementRef;
use tracing::debug;

use crate::column_filter;
use crate::dom::{self, StyleOracle, VisibilityOracle};
use crate::framework::{self, TableKind};
use crate::grid_builder::GridBuilder;
use crate::model::ExtractionResult;
use crate::options::ExtractOptions;

/// Outcome of classifying an arbitrary node.
#[derive(Debug, Clone, Copy)]
pub struct Classification<'a> {
    pub kind: TableKind,
    /// Framework root for framework kinds, the table for `Plain`, `None`
    /// when nothing table-like was found.
    pub element: Option<ElementRef<'a>>,
}

/// Decides which table family `node` belongs to.
///
/// The node and its ancestors are tested against each framework root in
/// priority order; otherwise the node itself when it is a table, else its
/// first descendant table, else the table enclosing it.
#[must_use]
pub fn classify(node: ElementRef<'_>) -> Classification<'_> {
    for kind in TableKind::FRAMEWORKS {
        if let Some(container) = kind.locate_container(node) {
            return Classification {
                kind,
                element: Some(container),
            };
        }
    }

    let table = if dom::is_table(node) {
        Some(node)
    } else {
        dom::first_table(node).or_else(|| dom::enclosing_table(node))
    };
    Classification {
        kind: TableKind::Plain,
        element: table,
    }
}

/// Extracts one table element: span resolution, then the optional
/// visible-column filter.
#[must_use]
pub fn extract_table<O>(
    table: ElementRef<'_>,
    options: &ExtractOptions,
    oracle: &O,
) -> ExtractionResult
where
    O: VisibilityOracle + ?Sized,
{
    let raw = GridBuilder::new(oracle, options.preserve_hyperlinks).build(table);
    column_filter::finalize(raw, options.only_visible_columns)
}

/// Entry point pairing classification with a visibility oracle.
#[derive(Debug, Clone, Default)]
pub struct Extractor<O = StyleOracle> {
    oracle: O,
}

impl Extractor<StyleOracle> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O> Extractor<O>
where
    O: VisibilityOracle,
{
    #[must_use]
    pub fn with_oracle(oracle: O) -> Self {
        Self { oracle }
    }

    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Extracts whatever logical table `node` belongs to. Never fails: a
    /// node with no table yields an empty result.
    #[must_use]
    pub fn extract(&self, node: ElementRef<'_>, options: &ExtractOptions) -> ExtractionResult {
        let classification = classify(node);
        debug!(kind = %classification.kind, found = classification.element.is_some(), "classified node");

        match classification {
            Classification {
                element: None, ..
            } => ExtractionResult::empty(),
            Classification {
                kind: TableKind::Plain,
                element: Some(table),
            } => extract_table(table, options, &self.oracle),
            Classification {
                kind,
                element: Some(container),
            } => framework::extract_framework(kind, container, options, &self.oracle),
        }
    }
}

/// [`Extractor::extract`] with the default [`StyleOracle`].
#[must_use]
pub fn extract(node: ElementRef<'_>, options: &ExtractOptions) -> ExtractionResult {
    Extractor::new().extract(node, options)
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::{classify, extract};
    use crate::framework::TableKind;
    use crate::options::ExtractOptions;

    fn by_css<'a>(html: &'a Html, css: &str) -> scraper::ElementRef<'a> {
        let selector = Selector::parse(css).expect("selector");
        html.select(&selector).next().expect("element")
    }

    #[test]
    fn classification_ignores_which_descendant_triggered() {
        let html = Html::parse_fragment(
            r#"<div class="el-table" id="root"><button id="btn">export</button>
                 <table class="el-table__body"><tr id="row"><td id="cell">1</td></tr></table></div>"#,
        );
        let root = by_css(&html, "#root").id();
        for css in ["#root", "#btn", "#row", "#cell"] {
            let classified = classify(by_css(&html, css));
            assert_eq!(classified.kind, TableKind::ElementPlus, "{css}");
            assert_eq!(classified.element.map(|el| el.id()), Some(root), "{css}");
        }
    }

    #[test]
    fn falls_back_to_descendant_table_then_empty() {
        let html = Html::parse_fragment(
            r#"<section id="s"><p>intro</p><table id="t"><tr><td>x</td></tr></table></section><p id="p">none</p>"#,
        );
        let classified = classify(by_css(&html, "#s"));
        assert_eq!(classified.kind, TableKind::Plain);
        assert_eq!(
            classified.element.map(|el| el.id()),
            Some(by_css(&html, "#t").id())
        );

        let empty = classify(by_css(&html, "#p"));
        assert!(empty.element.is_none());
        assert!(extract(by_css(&html, "#p"), &ExtractOptions::default()).is_empty());
    }

    #[test]
    fn cell_inside_plain_table_resolves_to_that_table() {
        let html = Html::parse_fragment(
            r#"<table id="outer"><tr><td><table id="inner"><tr><td id="cell"><a id="link" href="/x">x</a></td></tr></table></td></tr></table>"#,
        );
        let inner = by_css(&html, "#inner").id();
        for css in ["#cell", "#link"] {
            let classified = classify(by_css(&html, css));
            assert_eq!(classified.kind, TableKind::Plain, "{css}");
            assert_eq!(classified.element.map(|el| el.id()), Some(inner), "{css}");
        }

        let result = extract(by_css(&html, "#link"), &ExtractOptions::default());
        assert_eq!(result.grid, vec![vec!["x".to_string()]]);
        assert_eq!(result.links.len(), 1);
    }

    #[test]
    fn ant_design_outranks_nested_frameworks() {
        let html = Html::parse_fragment(
            r#"<div class="ant-table" id="ant"><div class="el-table" id="el"><span id="leaf">x</span></div></div>"#,
        );
        let classified = classify(by_css(&html, "#leaf"));
        assert_eq!(classified.kind, TableKind::AntDesign);
    }
}
