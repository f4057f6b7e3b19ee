use std::collections::{BTreeSet, HashMap};

use scraper::ElementRef;
use tracing::trace;

use crate::dom::{self, VisibilityOracle};
use crate::model::{ColumnVisibility, ExtractionResult, Link, MergeRegion};

/// Unfiltered output of one table element together with its per-column
/// visibility tally. Rows may still be ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub result: ExtractionResult,
    pub visibility: ColumnVisibility,
}

/// Converts a single table element into a grid, resolving row and column
/// span placeholders.
pub struct GridBuilder<'o, O: ?Sized> {
    oracle: &'o O,
    preserve_hyperlinks: bool,
}

impl<'o, O> GridBuilder<'o, O>
where
    O: VisibilityOracle + ?Sized,
{
    #[must_use]
    pub fn new(oracle: &'o O, preserve_hyperlinks: bool) -> Self {
        Self {
            oracle,
            preserve_hyperlinks,
        }
    }

    #[must_use]
    pub fn build(&self, table: ElementRef<'_>) -> RawTable {
        let mut state = BuildState::default();
        let rows = dom::table_rows(table);
        let row_count = rows.len();
        for (source_row, row) in rows.into_iter().enumerate() {
            self.build_row(&mut state, source_row, row_count - source_row, row);
        }
        state.finish()
    }

    /// `rows_left` counts this row and every source row after it.
    fn build_row(
        &self,
        state: &mut BuildState,
        source_row: usize,
        rows_left: usize,
        row: ElementRef<'_>,
    ) {
        let out_row = state.grid.len();
        let mut cells: Vec<Option<String>> = Vec::new();

        if let Some(blocked) = state.blocked.remove(&source_row) {
            for col in blocked {
                place(&mut cells, col, String::new());
            }
        }

        let mut cursor = 0_usize;
        for cell in dom::row_cells(row) {
            while cells.get(cursor).is_some_and(Option::is_some) {
                cursor += 1;
            }

            // A colspan stops at the first column an earlier rowspan holds.
            let declared_cols = dom::col_span(cell);
            let col_span = 1 + (cursor + 1..cursor + declared_cols)
                .take_while(|col| cells.get(*col).is_none_or(Option::is_none))
                .count();
            if col_span < declared_cols {
                trace!(
                    source_row,
                    col = cursor,
                    declared_cols,
                    col_span,
                    "cut colspan at reserved column"
                );
            }
            let row_span = dom::row_span(cell).min(rows_left);
            let text = dom::element_text(cell);
            let visible = self.oracle.is_visible(cell);

            for col in cursor..cursor + col_span {
                state.visibility.mark(col, visible);
            }

            if self.preserve_hyperlinks
                && let Some(href) = dom::cell_href(cell)
            {
                state.links.push(Link {
                    r: out_row,
                    c: cursor,
                    href,
                    tooltip: text.clone(),
                });
            }

            place(&mut cells, cursor, text);
            for col in cursor + 1..cursor + col_span {
                place(&mut cells, col, String::new());
            }

            if row_span > 1 || col_span > 1 {
                state.merges.push(MergeRegion::new(
                    out_row,
                    cursor,
                    out_row + row_span - 1,
                    cursor + col_span - 1,
                ));
                for offset in 1..row_span {
                    state
                        .blocked
                        .entry(source_row + offset)
                        .or_default()
                        .extend(cursor..cursor + col_span);
                }
            }

            cursor += 1;
        }

        if cells.is_empty() {
            trace!(source_row, "skipping row without cells");
            return;
        }

        state
            .grid
            .push(cells.into_iter().map(Option::unwrap_or_default).collect());
    }
}

#[derive(Debug, Default)]
struct BuildState {
    grid: Vec<Vec<String>>,
    merges: Vec<MergeRegion>,
    links: Vec<Link>,
    /// Source row index -> columns reserved by an active rowspan.
    blocked: HashMap<usize, BTreeSet<usize>>,
    visibility: ColumnVisibility,
}

impl BuildState {
    fn finish(self) -> RawTable {
        let Some(last_row) = self.grid.len().checked_sub(1) else {
            return RawTable {
                result: ExtractionResult::empty(),
                visibility: self.visibility,
            };
        };

        // A rowspan may reach past the last row; clamp it to the table.
        let merges = self
            .merges
            .into_iter()
            .filter_map(|mut merge| {
                merge.e.r = merge.e.r.min(last_row);
                if merge.is_single_cell() {
                    trace!(?merge, "dropping merge collapsed by table end");
                    None
                } else {
                    Some(merge)
                }
            })
            .collect();

        RawTable {
            result: ExtractionResult {
                grid: self.grid,
                merges,
                links: self.links,
            },
            visibility: self.visibility,
        }
    }
}

fn place(cells: &mut Vec<Option<String>>, col: usize, value: String) {
    if col >= cells.len() {
        cells.resize(col + 1, None);
    }
    cells[col] = Some(value);
}
