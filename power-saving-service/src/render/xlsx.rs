use std::path::Path;

use kepco_client::domain::{Cell, ResultSet};
use rust_xlsxwriter::{Table, TableColumn, TableStyle, Workbook, XlsxError};

use super::RenderError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "Sheet1";

/// Header row, one row per output row, and a banded `TableStyleMedium2`
/// table over the populated rectangle.
///
/// Excel tables need at least one data row, so an empty set gets headers only.
pub fn build_workbook(set: &ResultSet, table_name: &str) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let columns = set.columns();
    for (col, column) in columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, column.header())?;
    }

    for (idx, cells) in set.cell_rows().enumerate() {
        let row = idx as u32 + 1;
        for (col, cell) in cells.into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Cell::Number(q) => {
                    worksheet.write_number(row, col, q.as_f64())?;
                }
                Cell::Empty => {}
            }
        }
    }

    if !set.is_empty() {
        let table_columns: Vec<TableColumn> = columns
            .iter()
            .map(|c| TableColumn::new().set_header(c.header()))
            .collect();
        let table = Table::new()
            .set_name(table_name)
            .set_style(TableStyle::Medium2)
            .set_banded_rows(true)
            .set_columns(&table_columns);
        worksheet.add_table(0, 0, set.len() as u32, (columns.len() - 1) as u16, &table)?;
    }

    Ok(workbook)
}

pub fn to_xlsx_bytes(set: &ResultSet, table_name: &str) -> Result<Vec<u8>, RenderError> {
    let mut workbook = build_workbook(set, table_name)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn write_xlsx_file(set: &ResultSet, table_name: &str, path: &Path) -> Result<(), RenderError> {
    let mut workbook = build_workbook(set, table_name)?;
    workbook.save(path)?;
    Ok(())
}
