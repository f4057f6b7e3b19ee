use csv::WriterBuilder;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet};
use tracing::warn;

use crate::error::ExportError;
use crate::model::{ExtractionResult, Link, MergeRegion};
use crate::options::ExportFormat;

/// Excel opens UTF-8 CSV correctly only with a byte-order mark.
pub const UTF8_BOM: &str = "\u{feff}";

const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Serializes `result` in `format`. Relative hrefs are resolved against
/// `base_url` when one is given.
///
/// # Errors
/// Fails when the writer fails or the grid exceeds worksheet limits.
pub fn export(
    result: &ExtractionResult,
    sheet_name: &str,
    format: ExportFormat,
    base_url: Option<&url::Url>,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Xlsx => to_xlsx(result, sheet_name, base_url),
        ExportFormat::Csv => to_csv(result),
    }
}

/// BOM-prefixed CSV of the grid. Merges and links have no CSV form.
///
/// # Errors
/// Fails when a record cannot be written.
pub fn to_csv(result: &ExtractionResult) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_writer(UTF8_BOM.as_bytes().to_vec());
    for row in &result.grid {
        writer.write_record(row)?;
    }
    writer.flush()?;

    writer
        .into_inner()
        .map_err(|error| ExportError::Csv(error.into_error().into()))
}

/// Single-sheet workbook with merged ranges and cell hyperlinks.
///
/// # Errors
/// Fails on an invalid sheet name, an oversized grid or a writer error.
pub fn to_xlsx(
    result: &ExtractionResult,
    sheet_name: &str,
    base_url: Option<&url::Url>,
) -> Result<Vec<u8>, ExportError> {
    if result.row_count() > MAX_ROWS || result.column_count() > MAX_COLS {
        return Err(ExportError::TooLarge(format!(
            "{} rows x {} columns",
            result.row_count(),
            result.column_count()
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (r, row) in result.grid.iter().enumerate() {
        for (c, text) in row.iter().enumerate() {
            if !text.is_empty() {
                worksheet.write_string(row_num(r)?, col_num(c)?, text)?;
            }
        }
    }

    let merge_format = Format::new();
    for merge in result.merges.iter().filter(|merge| !merge.is_single_cell()) {
        write_merge(worksheet, result, merge, &merge_format)?;
    }

    for link in &result.links {
        write_link(worksheet, result, link, base_url)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_merge(
    worksheet: &mut Worksheet,
    result: &ExtractionResult,
    merge: &MergeRegion,
    format: &Format,
) -> Result<(), ExportError> {
    let text = result.cell(merge.s.r, merge.s.c).unwrap_or_default();
    if let Err(error) = worksheet.merge_range(
        row_num(merge.s.r)?,
        col_num(merge.s.c)?,
        row_num(merge.e.r)?,
        col_num(merge.e.c)?,
        text,
        format,
    ) {
        warn!(?merge, %error, "skipping merge region rejected by workbook writer");
    }
    Ok(())
}

fn write_link(
    worksheet: &mut Worksheet,
    result: &ExtractionResult,
    link: &Link,
    base_url: Option<&url::Url>,
) -> Result<(), ExportError> {
    let (row, col) = (row_num(link.r)?, col_num(link.c)?);
    let text = result.cell(link.r, link.c).unwrap_or_default();
    let target = resolve_href(&link.href, base_url);

    let mut url = rust_xlsxwriter::Url::new(target.as_str());
    if !text.is_empty() {
        url = url.set_text(text);
    }
    if !link.tooltip.is_empty() {
        url = url.set_tip(link.tooltip.as_str());
    }

    if let Err(error) = worksheet.write_url(row, col, url) {
        warn!(href = %link.href, %error, "keeping plain text for unsupported hyperlink");
        if !text.is_empty() {
            worksheet.write_string(row, col, text)?;
        }
    }
    Ok(())
}

/// Absolute hrefs pass through; relative ones are joined onto `base_url`.
#[must_use]
pub fn resolve_href(href: &str, base_url: Option<&url::Url>) -> String {
    if url::Url::parse(href).is_ok() {
        return href.to_string();
    }
    base_url
        .and_then(|base| base.join(href).ok())
        .map_or_else(|| href.to_string(), |joined| joined.to_string())
}

fn row_num(index: usize) -> Result<RowNum, ExportError> {
    RowNum::try_from(index).map_err(|_| ExportError::TooLarge(format!("row {index}")))
}

fn col_num(index: usize) -> Result<ColNum, ExportError> {
    ColNum::try_from(index).map_err(|_| ExportError::TooLarge(format!("column {index}")))
}
