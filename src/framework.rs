//! Table-widget families that split one logical table into separate
//! header/body and left/main/right physical tables.

use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use serde::Serialize;
use tracing::debug;

use crate::combine::{concat_segments, stack_vertical};
use crate::column_filter::rectangularize;
use crate::dom::{self, VisibilityOracle};
use crate::extract::extract_table;
use crate::model::{ExtractionResult, Segment};
use crate::options::ExtractOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableKind {
    /// A bare `table` element.
    Plain,
    ElementPlus,
    NaiveUi,
    AntDesign,
    ViewUi,
    Arco,
    #[serde(rename = "tdesign")]
    TDesign,
}

impl TableKind {
    /// Framework families in classification priority order.
    pub const FRAMEWORKS: [Self; 6] = [
        Self::AntDesign,
        Self::ElementPlus,
        Self::NaiveUi,
        Self::ViewUi,
        Self::Arco,
        Self::TDesign,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::ElementPlus => "element-plus",
            Self::NaiveUi => "naive-ui",
            Self::AntDesign => "ant-design",
            Self::ViewUi => "view-ui",
            Self::Arco => "arco",
            Self::TDesign => "tdesign",
        }
    }

    /// Matches the framework's root container.
    #[must_use]
    pub fn root_selector(self) -> Option<&'static Selector> {
        self.layout().map(|layout| &layout.root_selector)
    }

    /// Class carried by the framework's root container.
    #[must_use]
    pub fn root_class(self) -> Option<&'static str> {
        self.layout().map(|layout| layout.root_class)
    }

    fn layout(self) -> Option<&'static Layout> {
        match self {
            Self::Plain => None,
            Self::ElementPlus => Some(&*ELEMENT_PLUS),
            Self::NaiveUi => Some(&*NAIVE_UI),
            Self::AntDesign => Some(&*ANT_DESIGN),
            Self::ViewUi => Some(&*VIEW_UI),
            Self::Arco => Some(&*ARCO),
            Self::TDesign => Some(&*TDESIGN),
        }
    }

    /// The framework root that `node` belongs to, if any.
    #[must_use]
    pub fn locate_container(self, node: ElementRef<'_>) -> Option<ElementRef<'_>> {
        let layout = self.layout()?;
        dom::closest_with_class(node, layout.root_class).or_else(|| {
            layout
                .inner_markers
                .iter()
                .any(|marker| dom::has_class(node, marker))
                .then_some(node)
        })
    }

    /// Element inside `container` that hosts the export control and scopes
    /// every slot lookup.
    #[must_use]
    pub fn wrapper(self, container: ElementRef<'_>) -> ElementRef<'_> {
        self.layout()
            .and_then(|layout| layout.wrapper.as_ref())
            .and_then(|selector| container.select(selector).next())
            .unwrap_or(container)
    }
}

impl Display for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One way of finding a slot's table inside the framework root.
#[derive(Debug)]
enum Locator {
    /// First element matching the selector.
    Css(Selector),
    /// First table owning an element matched by the selector (`thead`,
    /// `tbody`).
    TableWith(Selector),
}

#[derive(Debug, Default)]
struct SlotRow {
    left: Vec<Locator>,
    main: Vec<Locator>,
    right: Vec<Locator>,
}

#[derive(Debug)]
struct Layout {
    root_class: &'static str,
    /// `.root_class`, for finding roots below a node.
    root_selector: Selector,
    /// Classes of inner elements that identify the framework even without
    /// the root class above them.
    inner_markers: &'static [&'static str],
    wrapper: Option<Selector>,
    header: SlotRow,
    body: SlotRow,
}

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("hardcoded slot selector is valid")
}

fn locators(selectors: &[&str]) -> Vec<Locator> {
    selectors.iter().map(|selector| Locator::Css(css(selector))).collect()
}

impl Layout {
    fn new(root_class: &'static str) -> Self {
        Self {
            root_class,
            root_selector: css(&format!(".{root_class}")),
            inner_markers: &[],
            wrapper: None,
            header: SlotRow::default(),
            body: SlotRow::default(),
        }
    }

    /// Header and body rows with fixed-left, main and fixed-right tables
    /// under `{prefix}-header` / `{prefix}-body` and `{prefix}-fixed-*`.
    fn fixed_sides(root_class: &'static str, prefix: &str, sep: &str) -> Self {
        let side = |scope: &str, part: &str| {
            vec![Locator::Css(css(&format!("{scope}.{prefix}{sep}{part} table")))]
        };
        let row = |part: &str| SlotRow {
            left: side(&format!(".{prefix}{sep}fixed-left "), part),
            main: side("", part),
            right: side(&format!(".{prefix}{sep}fixed-right "), part),
        };
        Self {
            header: row("header"),
            body: row("body"),
            ..Self::new(root_class)
        }
    }
}

static ELEMENT_PLUS: LazyLock<Layout> = LazyLock::new(|| Layout {
    header: SlotRow {
        main: locators(&[".el-table__header"]),
        ..SlotRow::default()
    },
    body: SlotRow {
        main: locators(&[".el-table__body"]),
        ..SlotRow::default()
    },
    ..Layout::new("el-table")
});

static NAIVE_UI: LazyLock<Layout> = LazyLock::new(|| {
    let mut header = locators(&[".n-data-table-base-table-header table"]);
    header.push(Locator::TableWith(css("thead")));
    let mut body = locators(&[
        ".n-data-table-base-table-body table",
        ".n-data-table-body table",
    ]);
    body.push(Locator::TableWith(css("tbody")));
    Layout {
        header: SlotRow {
            main: header,
            ..SlotRow::default()
        },
        body: SlotRow {
            main: body,
            ..SlotRow::default()
        },
        ..Layout::new("n-data-table")
    }
});

static ANT_DESIGN: LazyLock<Layout> = LazyLock::new(|| {
    let mut layout = Layout::fixed_sides("ant-table", "ant-table", "-");
    layout.body.main.push(Locator::Css(css(".ant-table-content table")));
    Layout {
        inner_markers: &["ant-table-container"],
        wrapper: Some(css(".ant-table-container")),
        ..layout
    }
});

static VIEW_UI: LazyLock<Layout> =
    LazyLock::new(|| Layout::fixed_sides("ivu-table", "ivu-table", "-"));

static ARCO: LazyLock<Layout> = LazyLock::new(|| Layout {
    wrapper: Some(css(".arco-table-container")),
    ..Layout::fixed_sides("arco-table", "arco-table", "-")
});

static TDESIGN: LazyLock<Layout> = LazyLock::new(|| Layout {
    wrapper: Some(css(".t-table__content")),
    ..Layout::fixed_sides("t-table", "t-table", "__")
});

/// Sub-tables found for each of the six slots, `[left, main, right]`.
#[derive(Debug, Default)]
pub struct ResolvedSlots<'a> {
    pub header: [Option<ElementRef<'a>>; 3],
    pub body: [Option<ElementRef<'a>>; 3],
}

impl ResolvedSlots<'_> {
    #[must_use]
    pub fn found(&self) -> usize {
        self.header.iter().chain(&self.body).flatten().count()
    }
}

/// Resolves every slot of `kind` inside `container`.
///
/// A table is claimed by at most one slot. Body slots resolve before header
/// slots, and fixed sides before the main side, so the broad main selectors
/// cannot steal a fixed-column table or a single combined table.
#[must_use]
pub fn resolve_slots(kind: TableKind, container: ElementRef<'_>) -> ResolvedSlots<'_> {
    let Some(layout) = kind.layout() else {
        return ResolvedSlots::default();
    };
    let root = kind.wrapper(container);
    let mut claimed = Vec::new();
    let mut slots = ResolvedSlots::default();

    for (row, target) in [(&layout.body, &mut slots.body), (&layout.header, &mut slots.header)] {
        for (index, locators) in [(0, &row.left), (2, &row.right), (1, &row.main)] {
            target[index] = resolve_locators(root, locators, &mut claimed);
        }
    }

    slots
}

fn resolve_locators<'a>(
    root: ElementRef<'a>,
    locators: &[Locator],
    claimed: &mut Vec<ego_tree::NodeId>,
) -> Option<ElementRef<'a>> {
    let unclaimed = |table: &ElementRef<'a>| !claimed.contains(&table.id());
    let found = locators.iter().find_map(|locator| match locator {
        Locator::Css(selector) => root
            .select(selector)
            .find(|found| as_table(*found).is_some_and(|table| unclaimed(&table)))
            .and_then(as_table),
        Locator::TableWith(section) => dom::tables(root).into_iter().find(|table| {
            unclaimed(table) && owns_section(*table, section)
        }),
    })?;
    claimed.push(found.id());
    Some(found)
}

fn as_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if dom::is_table(element) {
        Some(element)
    } else {
        dom::first_table(element)
    }
}

fn owns_section(table: ElementRef<'_>, section: &Selector) -> bool {
    table
        .select(section)
        .any(|found| dom::enclosing_table(found).is_some_and(|owner| owner.id() == table.id()))
}

/// Extracts every present slot and recombines them: header slots side by
/// side, body slots side by side, then header above body.
///
/// Header slots always drop hidden columns so the header width does not
/// depend on the caller's column option.
#[must_use]
pub fn extract_framework<O>(
    kind: TableKind,
    container: ElementRef<'_>,
    options: &ExtractOptions,
    oracle: &O,
) -> ExtractionResult
where
    O: VisibilityOracle + ?Sized,
{
    let slots = resolve_slots(kind, container);
    debug!(%kind, slots = slots.found(), "resolved framework slots");

    let header_options = ExtractOptions {
        only_visible_columns: true,
        ..*options
    };
    let header = extract_row(&slots.header, HEADER_LABELS, &header_options, oracle);
    let body = extract_row(&slots.body, BODY_LABELS, options, oracle);

    rectangularize(stack_vertical(header, body))
}

const HEADER_LABELS: [&str; 3] = ["header-left", "header-main", "header-right"];
const BODY_LABELS: [&str; 3] = ["body-left", "body-main", "body-right"];

fn extract_row<O>(
    tables: &[Option<ElementRef<'_>>; 3],
    labels: [&'static str; 3],
    options: &ExtractOptions,
    oracle: &O,
) -> ExtractionResult
where
    O: VisibilityOracle + ?Sized,
{
    let segments = tables
        .iter()
        .zip(labels)
        .map(|(table, label)| {
            table.map(|table| {
                let result = extract_table(table, options, oracle);
                debug!(
                    label,
                    rows = result.row_count(),
                    cols = result.column_count(),
                    "extracted segment"
                );
                Segment { label, result }
            })
        })
        .collect();
    concat_segments(segments)
}
