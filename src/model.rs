use serde::{Deserialize, Serialize};

/// Row/column coordinate in the grid of the stage that produced it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub r: usize,
    pub c: usize,
}

/// Inclusive rectangle covering one spanning source cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MergeRegion {
    pub s: CellPos,
    pub e: CellPos,
}

impl MergeRegion {
    #[must_use]
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            s: CellPos {
                r: start_row,
                c: start_col,
            },
            e: CellPos {
                r: end_row,
                c: end_col,
            },
        }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.e.r - self.s.r + 1
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.e.c - self.s.c + 1
    }

    #[must_use]
    pub fn is_single_cell(&self) -> bool {
        self.s == self.e
    }

    #[must_use]
    pub(crate) fn shifted(self, rows: usize, cols: usize) -> Self {
        Self::new(self.s.r + rows, self.s.c + cols, self.e.r + rows, self.e.c + cols)
    }
}

/// Hyperlink held by the anchor cell of a (possibly merged) region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub r: usize,
    pub c: usize,
    pub href: String,
    pub tooltip: String,
}

impl Link {
    #[must_use]
    pub(crate) fn shifted(mut self, rows: usize, cols: usize) -> Self {
        self.r += rows;
        self.c += cols;
        self
    }
}

/// The `{grid, merges, links}` triple passed between every pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionResult {
    #[serde(rename = "data")]
    pub grid: Vec<Vec<String>>,
    pub merges: Vec<MergeRegion>,
    pub links: Vec<Link>,
}

impl ExtractionResult {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    /// Width of the widest row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.grid
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        let width = self.column_count();
        self.grid.iter().all(|row| row.len() == width)
    }
}

/// Per-column visibility tally: a column is visible when any cell occupying
/// it, directly or through a colspan, is visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    columns: Vec<bool>,
}

impl ColumnVisibility {
    pub fn mark(&mut self, col: usize, visible: bool) {
        if col >= self.columns.len() {
            self.columns.resize(col + 1, false);
        }
        self.columns[col] |= visible;
    }

    #[must_use]
    pub fn is_visible(&self, col: usize) -> bool {
        self.columns.get(col).copied().unwrap_or(false)
    }
}

/// One sub-table output before it is combined into the logical table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub label: &'static str,
    pub result: ExtractionResult,
}
