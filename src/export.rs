use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::json;

use crate::constants::OWNERSHIP_SHEET;
use crate::error::Result;
use crate::loader::{
    date_to_serial, COL_FLOAT, COL_HOLDERS, COL_INDUSTRY, COL_NAME, COL_OUTSTANDING,
    COL_PERCENT_HELD, COL_QUARTER, COL_SHARES_BOUGHT, COL_SHARES_SOLD, COL_SHARE_HELD, COL_SYMBOL,
};
use crate::logging;
use crate::model::OwnershipRecord;

pub use crate::constants::EXPORT_MIME_TYPE;

const COL_QUARTER_LABEL: &str = "quarter_date_str";
const COL_NET_CHANGE: &str = "NetSharesChange";
const COL_PERCENT_CHANGE: &str = "PercentChangeHeld";
const COL_OWNERSHIP_VALUE: &str = "InstitutionOwnershipValue";

const HEADERS: [&str; 15] = [
    COL_SYMBOL,
    COL_NAME,
    COL_INDUSTRY,
    COL_QUARTER,
    COL_PERCENT_HELD,
    COL_SHARES_BOUGHT,
    COL_SHARES_SOLD,
    COL_OUTSTANDING,
    COL_FLOAT,
    COL_HOLDERS,
    COL_QUARTER_LABEL,
    COL_NET_CHANGE,
    COL_PERCENT_CHANGE,
    COL_OWNERSHIP_VALUE,
    COL_SHARE_HELD,
];

/// Serialize the full ownership table, raw and derived columns, to an xlsx buffer.
pub fn to_xlsx(records: &[OwnershipRecord]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(records)?;
    Ok(workbook.save_to_buffer()?)
}

/// Write the full ownership table to `path`.
pub fn write_workbook(records: &[OwnershipRecord], path: &Path) -> Result<()> {
    let mut workbook = build_workbook(records)?;
    workbook.save(path)?;
    logging::info(
        "export.write",
        "Processed ownership table written",
        json!({ "path": path.display().to_string(), "rows": records.len() }),
    );
    Ok(())
}

fn build_workbook(records: &[OwnershipRecord]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OWNERSHIP_SHEET)?;

    let header_format = Format::new().set_bold();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for (idx, record) in records.iter().enumerate() {
        write_record(worksheet, idx as u32 + 1, record, &date_format)?;
    }

    Ok(workbook)
}

fn write_record(
    worksheet: &mut Worksheet,
    row: u32,
    record: &OwnershipRecord,
    date_format: &Format,
) -> Result<()> {
    worksheet.write_string(row, 0, &record.company_symbol)?;
    worksheet.write_string(row, 1, &record.company_name)?;
    worksheet.write_string(row, 2, &record.industry)?;
    if let Some(date) = record.quarter_date {
        worksheet.write_number_with_format(row, 3, date_to_serial(date), date_format)?;
    }

    let numbers = [
        (4, record.institution_percent_held),
        (5, record.institution_shares_bought),
        (6, record.institution_shares_sold),
        (7, record.total_shares_outstanding),
        (8, record.share_float),
        (9, record.institution_holder_number),
        (11, record.net_shares_change),
        (12, record.percent_change_held),
        (13, record.institution_ownership_value),
        (14, record.institution_share_held),
    ];
    // Non-finite values stay blank.
    for (col, value) in numbers.into_iter().filter(|(_, value)| value.is_finite()) {
        worksheet.write_number(row, col, value)?;
    }

    if let Some(label) = record.quarter_label() {
        worksheet.write_string(row, 10, &label)?;
    }
    Ok(())
}
