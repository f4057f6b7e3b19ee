use tracing::trace;

use crate::grid_builder::RawTable;
use crate::model::{ExtractionResult, Link, MergeRegion};

/// Applies the visible-column filter when enabled, then pads every row to
/// the widest one so the result is rectangular.
#[must_use]
pub fn finalize(raw: RawTable, only_visible_columns: bool) -> ExtractionResult {
    if only_visible_columns {
        filter_visible_columns(raw)
    } else {
        rectangularize(raw.result)
    }
}

/// Keeps only columns whose visibility tally is set. Merges with an
/// unmappable endpoint column and links in dropped columns are discarded.
#[must_use]
pub fn filter_visible_columns(raw: RawTable) -> ExtractionResult {
    let RawTable { result, visibility } = raw;
    let max_columns = result.column_count();

    let mut index_map = vec![None; max_columns];
    let mut next = 0_usize;
    for (old, slot) in index_map.iter_mut().enumerate() {
        if visibility.is_visible(old) {
            *slot = Some(next);
            next += 1;
        }
    }
    let map = |col: usize| index_map.get(col).copied().flatten();

    let grid = result
        .grid
        .iter()
        .map(|row| {
            index_map
                .iter()
                .enumerate()
                .filter(|(_, mapped)| mapped.is_some())
                .map(|(old, _)| row.get(old).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    let merges = result
        .merges
        .into_iter()
        .filter_map(|merge| match (map(merge.s.c), map(merge.e.c)) {
            (Some(start), Some(end)) => Some(MergeRegion::new(merge.s.r, start, merge.e.r, end)),
            _ => {
                trace!(?merge, "dropping merge with hidden boundary column");
                None
            }
        })
        .collect();

    let links = result
        .links
        .into_iter()
        .filter_map(|link| match map(link.c) {
            Some(c) => Some(Link { c, ..link }),
            None => {
                trace!(href = %link.href, "dropping link in hidden column");
                None
            }
        })
        .collect();

    ExtractionResult {
        grid,
        merges,
        links,
    }
}

/// Pads trailing absent cells with empty strings.
#[must_use]
pub fn rectangularize(mut result: ExtractionResult) -> ExtractionResult {
    let width = result.column_count();
    for row in &mut result.grid {
        row.resize(width, String::new());
    }
    result
}
