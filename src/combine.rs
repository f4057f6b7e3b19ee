use tracing::trace;

use crate::model::{ExtractionResult, Segment};

/// Joins segments left to right. Absent segments are skipped; a segment with
/// fewer rows than the tallest one is padded with rows of its own width, and
/// its merges and links move right by the widths of the segments before it.
#[must_use]
pub fn concat_horizontal(parts: &[Option<ExtractionResult>]) -> ExtractionResult {
    let parts = parts.iter().flatten().collect::<Vec<_>>();
    if parts.is_empty() {
        return ExtractionResult::empty();
    }

    let widths = parts
        .iter()
        .map(|part| part.column_count())
        .collect::<Vec<_>>();
    let offsets = widths
        .iter()
        .scan(0_usize, |offset, width| {
            let current = *offset;
            *offset += width;
            Some(current)
        })
        .collect::<Vec<_>>();
    let total_width = widths.iter().sum::<usize>();
    let max_rows = parts.iter().map(|part| part.row_count()).max().unwrap_or(0);

    let grid = (0..max_rows)
        .map(|row_index| {
            let mut row = Vec::with_capacity(total_width);
            for (part, width) in parts.iter().zip(&widths) {
                let start = row.len();
                if let Some(cells) = part.grid.get(row_index) {
                    row.extend(cells.iter().cloned());
                }
                row.resize(start + width, String::new());
            }
            row
        })
        .collect();

    let mut merges = Vec::new();
    let mut links = Vec::new();
    for (part, offset) in parts.iter().zip(&offsets) {
        merges.extend(part.merges.iter().map(|merge| merge.shifted(0, *offset)));
        links.extend(part.links.iter().cloned().map(|link| link.shifted(0, *offset)));
    }

    ExtractionResult {
        grid,
        merges,
        links,
    }
}

/// Places `header` rows above `body` rows; body coordinates move down by the
/// header's row count.
#[must_use]
pub fn stack_vertical(header: ExtractionResult, body: ExtractionResult) -> ExtractionResult {
    let row_offset = header.row_count();
    let ExtractionResult {
        mut grid,
        mut merges,
        mut links,
    } = header;

    grid.extend(body.grid);
    merges.extend(body.merges.into_iter().map(|merge| merge.shifted(row_offset, 0)));
    links.extend(body.links.into_iter().map(|link| link.shifted(row_offset, 0)));

    ExtractionResult {
        grid,
        merges,
        links,
    }
}

/// Convenience over [`concat_horizontal`] for labelled segments.
#[must_use]
pub fn concat_segments(segments: Vec<Option<Segment>>) -> ExtractionResult {
    let parts = segments
        .into_iter()
        .map(|segment| {
            segment.map(|segment| {
                trace!(label = segment.label, width = segment.result.column_count(), "joining segment");
                segment.result
            })
        })
        .collect::<Vec<_>>();
    concat_horizontal(&parts)
}
