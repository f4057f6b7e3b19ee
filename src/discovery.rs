//! Finds tables that should get an export control, once per element, as a
//! page is loaded and as batches of nodes are added to it.

use std::collections::HashSet;
use std::sync::LazyLock;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::dom::{self, StyleOracle, VisibilityOracle};
use crate::framework::TableKind;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("hardcoded table selector is valid"));

/// Something a host would decorate with an export control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportTarget {
    pub kind: TableKind,
    /// The table, or the framework root.
    pub container: NodeId,
    /// Where the control is attached and where extraction starts from.
    pub anchor: NodeId,
}

impl ExportTarget {
    #[must_use]
    pub fn anchor_element<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        element(html, self.anchor)
    }
}

/// Which nodes have already been decorated, keyed by node identity only.
///
/// Entries never keep a node alive; [`InstrumentedRegistry::retain_attached`]
/// forgets nodes that were removed from the document.
#[derive(Debug, Clone, Default)]
pub struct InstrumentedRegistry {
    entries: HashSet<(TableKind, NodeId)>,
}

impl InstrumentedRegistry {
    /// Returns false when the node was already registered for `kind`.
    pub fn insert(&mut self, kind: TableKind, node: NodeId) -> bool {
        self.entries.insert((kind, node))
    }

    #[must_use]
    pub fn contains(&self, kind: TableKind, node: NodeId) -> bool {
        self.entries.contains(&(kind, node))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops entries whose node is gone or detached; returns how many.
    pub fn retain_attached(&mut self, html: &Html) -> usize {
        let before = self.entries.len();
        let root = html.tree.root().id();
        self.entries.retain(|(_, id)| {
            html.tree.get(*id).is_some_and(|node| {
                node.id() == root || node.ancestors().any(|ancestor| ancestor.id() == root)
            })
        });
        before - self.entries.len()
    }
}

/// Incremental table discovery guarded by an [`InstrumentedRegistry`].
#[derive(Debug, Clone, Default)]
pub struct Scanner<O = StyleOracle> {
    oracle: O,
    registry: InstrumentedRegistry,
}

impl Scanner<StyleOracle> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O> Scanner<O>
where
    O: VisibilityOracle,
{
    #[must_use]
    pub fn with_oracle(oracle: O) -> Self {
        Self {
            oracle,
            registry: InstrumentedRegistry::default(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &InstrumentedRegistry {
        &self.registry
    }

    /// Initial pass over every table already in the document.
    pub fn scan_document(&mut self, html: &Html) -> Vec<ExportTarget> {
        let mut found = Vec::new();
        for table in html.select(&TABLE_SELECTOR) {
            self.process_table(table, &mut found);
        }
        debug!(targets = found.len(), "scanned document");
        found
    }

    /// Inspects one batch of newly added nodes, and only those subtrees.
    pub fn on_nodes_added(&mut self, html: &Html, added: &[NodeId]) -> Vec<ExportTarget> {
        let mut found = Vec::new();
        for node in added.iter().filter_map(|id| element(html, *id)) {
            if dom::is_table(node) {
                self.process_table(node, &mut found);
                continue;
            }

            for kind in TableKind::FRAMEWORKS {
                let (Some(class), Some(selector)) = (kind.root_class(), kind.root_selector())
                else {
                    continue;
                };
                if dom::has_class(node, class) {
                    self.process_framework(kind, node, &mut found);
                }
                for container in node.select(selector) {
                    self.process_framework(kind, container, &mut found);
                }
            }

            for table in node.select(&TABLE_SELECTOR) {
                self.process_table(table, &mut found);
            }
        }
        debug!(added = added.len(), targets = found.len(), "processed mutation batch");
        found
    }

    /// Forgets nodes no longer attached to `html`.
    pub fn prune(&mut self, html: &Html) -> usize {
        self.registry.retain_attached(html)
    }

    fn process_table(&mut self, table: ElementRef<'_>, found: &mut Vec<ExportTarget>) {
        if self.registry.contains(TableKind::Plain, table.id()) || !self.oracle.is_visible(table) {
            return;
        }

        // Sub-tables of a widget are handled through their container.
        for kind in TableKind::FRAMEWORKS {
            if let Some(container) = kind.locate_container(table) {
                self.process_framework(kind, container, found);
                return;
            }
        }

        self.registry.insert(TableKind::Plain, table.id());
        found.push(ExportTarget {
            kind: TableKind::Plain,
            container: table.id(),
            anchor: table.id(),
        });
    }

    fn process_framework(
        &mut self,
        kind: TableKind,
        container: ElementRef<'_>,
        found: &mut Vec<ExportTarget>,
    ) {
        if self.registry.contains(kind, container.id()) || !self.oracle.is_visible(container) {
            return;
        }
        self.registry.insert(kind, container.id());
        found.push(ExportTarget {
            kind,
            container: container.id(),
            anchor: kind.wrapper(container).id(),
        });
    }
}

fn element(html: &Html, id: NodeId) -> Option<ElementRef<'_>> {
    html.tree.get(id).and_then(ElementRef::wrap)
}
