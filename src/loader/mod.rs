//! Workbook loading: sheet lookup, schema detection and typed record assembly.

mod cache;
mod table;

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use serde_json::json;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::logging;
use crate::model::{HoldingColumn, InstitutionHoldingRecord, OwnershipInput, OwnershipRecord};

pub use cache::DatasetCache;
pub use table::RawTable;

use table::{cell, cell_date, cell_number, cell_text};

pub(crate) use table::date_to_serial;

pub const COL_SYMBOL: &str = "Company_symbol";
pub const COL_NAME: &str = "Company_name";
pub const COL_INDUSTRY: &str = "industry";
pub const COL_QUARTER: &str = "quarter_date";
pub const COL_PERCENT_HELD: &str = "InstitutionPercentHeld";
pub const COL_SHARES_BOUGHT: &str = "InstitutionSharesBought";
pub const COL_SHARES_SOLD: &str = "InstitutionSharesSold";
pub const COL_OUTSTANDING: &str = "Total_SharesOutstanding";
pub const COL_FLOAT: &str = "Sharefloat";
pub const COL_HOLDERS: &str = "Institutionholdernumber";
pub const COL_SHARE_HELD: &str = "InstitutionShareHeld";
pub const COL_OWNER: &str = "owner_name";

/// Both tables of one source workbook, immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub ownership: Vec<OwnershipRecord>,
    pub holdings: Vec<InstitutionHoldingRecord>,
}

/// Parse an in-memory workbook (xlsx, xls or ods) into a [`Dataset`].
pub fn parse_workbook(bytes: Vec<u8>, config: &DashboardConfig) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let ownership_table = read_sheet(&mut workbook, &config.ownership_sheet)?;
    let holdings_table = read_sheet(&mut workbook, &config.holdings_sheet)?;

    Ok(Dataset {
        ownership: load_ownership(&ownership_table, &config.ownership_sheet)?,
        holdings: load_holdings(&holdings_table, &config.holdings_sheet)?,
    })
}

/// Parse only the ownership sheet of an in-memory workbook, e.g. a processed export.
pub fn parse_ownership_sheet(bytes: Vec<u8>, sheet: &str) -> Result<Vec<OwnershipRecord>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let table = read_sheet(&mut workbook, sheet)?;
    load_ownership(&table, sheet)
}

fn read_sheet(workbook: &mut Sheets<Cursor<Vec<u8>>>, name: &str) -> Result<RawTable> {
    if !workbook.sheet_names().iter().any(|sheet| sheet == name) {
        return Err(DashboardError::SheetMissing(name.to_string()));
    }
    let range = workbook.worksheet_range(name)?;
    Ok(RawTable::from_range(&range))
}

/// Column positions of the ownership sheet, resolved once from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipSchema {
    symbol: usize,
    name: usize,
    industry: usize,
    quarter: usize,
    percent_held: usize,
    shares_bought: usize,
    shares_sold: usize,
    outstanding: usize,
    float: usize,
    holders: usize,
    share_held: Option<usize>,
}

impl OwnershipSchema {
    pub fn detect(table: &RawTable, sheet: &str) -> Result<Self> {
        let require = |column: &str| {
            table
                .column(column)
                .ok_or_else(|| DashboardError::MissingColumn {
                    sheet: sheet.to_string(),
                    column: column.to_string(),
                })
        };

        Ok(Self {
            symbol: require(COL_SYMBOL)?,
            name: require(COL_NAME)?,
            industry: require(COL_INDUSTRY)?,
            quarter: require(COL_QUARTER)?,
            percent_held: require(COL_PERCENT_HELD)?,
            shares_bought: require(COL_SHARES_BOUGHT)?,
            shares_sold: require(COL_SHARES_SOLD)?,
            outstanding: require(COL_OUTSTANDING)?,
            float: require(COL_FLOAT)?,
            holders: require(COL_HOLDERS)?,
            share_held: table.column(COL_SHARE_HELD),
        })
    }

    pub fn provides_share_held(&self) -> bool {
        self.share_held.is_some()
    }
}

/// Build ownership records with every derived field populated.
///
/// Unparsable quarter values become `None` and the row is kept; raw numeric
/// cells that do not coerce become `NaN` and flow into the derived fields.
pub fn load_ownership(table: &RawTable, sheet: &str) -> Result<Vec<OwnershipRecord>> {
    let schema = OwnershipSchema::detect(table, sheet)?;
    let number =
        |row: &[Data], index: usize| cell_number(cell(row, index)).unwrap_or(f64::NAN);

    let records: Vec<OwnershipRecord> = table
        .data_rows()
        .map(|row| {
            OwnershipRecord::derive(OwnershipInput {
                company_symbol: cell_text(cell(row, schema.symbol)),
                company_name: cell_text(cell(row, schema.name)),
                industry: cell_text(cell(row, schema.industry)),
                quarter_date: cell_date(cell(row, schema.quarter)),
                institution_percent_held: number(row, schema.percent_held),
                institution_shares_bought: number(row, schema.shares_bought),
                institution_shares_sold: number(row, schema.shares_sold),
                total_shares_outstanding: number(row, schema.outstanding),
                share_float: number(row, schema.float),
                institution_holder_number: number(row, schema.holders),
                institution_share_held: schema.share_held.map(|index| number(row, index)),
            })
        })
        .collect();

    let invalid_dates = records
        .iter()
        .filter(|record| record.quarter_date.is_none())
        .count();
    if invalid_dates > 0 {
        logging::warn(
            "loader.invalid_dates",
            "Rows with unparsable quarter dates are excluded from date-ordered views",
            json!({ "sheet": sheet, "rows": invalid_dates }),
        );
    }
    logging::info(
        "loader.ownership",
        "Ownership table loaded",
        json!({
            "sheet": sheet,
            "rows": records.len(),
            "share_held_provided": schema.provides_share_held(),
        }),
    );

    Ok(records)
}

/// Build holdings records; numeric fields that fail coercion (or whose column
/// is absent) become `0.0` and the row is never dropped.
pub fn load_holdings(table: &RawTable, sheet: &str) -> Result<Vec<InstitutionHoldingRecord>> {
    let missing = |column: &str| DashboardError::MissingColumn {
        sheet: sheet.to_string(),
        column: column.to_string(),
    };
    let symbol = table.column(COL_SYMBOL).ok_or_else(|| missing(COL_SYMBOL))?;
    let owner = table.column(COL_OWNER).ok_or_else(|| missing(COL_OWNER))?;
    let numeric = HoldingColumn::ALL.map(|column| table.column(column.header()));

    let number = |row: &[Data], index: Option<usize>| {
        index
            .and_then(|index| cell_number(cell(row, index)))
            .filter(|value| !value.is_nan())
            .unwrap_or(0.0)
    };

    let records: Vec<InstitutionHoldingRecord> = table
        .data_rows()
        .map(|row| InstitutionHoldingRecord {
            company_symbol: cell_text(cell(row, symbol)),
            owner_name: cell_text(cell(row, owner)),
            total_market_value: number(row, numeric[0]),
            total_shares: number(row, numeric[1]),
            share_change: number(row, numeric[2]),
            share_change_percentage: number(row, numeric[3]),
        })
        .collect();

    logging::info(
        "loader.holdings",
        "Institution holdings table loaded",
        json!({ "sheet": sheet, "rows": records.len() }),
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Data {
        Data::String(value.to_string())
    }

    fn ownership_headers(with_share_held: bool) -> Vec<String> {
        let mut headers: Vec<String> = [
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
        ]
        .iter()
        .map(|header| header.to_string())
        .collect();
        if with_share_held {
            headers.push(COL_SHARE_HELD.to_string());
        }
        headers
    }

    fn ownership_row(symbol: &str, quarter: Data, outstanding: f64) -> Vec<Data> {
        vec![
            text(symbol),
            text("Acme Corp"),
            text("Industrials"),
            quarter,
            Data::Float(40.0),
            Data::Int(1_500_000),
            Data::Int(250_000),
            Data::Float(outstanding),
            Data::Float(80_000_000.0),
            Data::Int(512),
        ]
    }

    #[test]
    fn ownership_rows_get_derived_fields() {
        logging::set_silent(true);
        let table = RawTable::new(
            ownership_headers(false),
            vec![ownership_row("ACME", text("2024-06-30"), 100_000_000.0)],
        );

        let records = load_ownership(&table, "Sheet1").expect("load ownership");
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.net_shares_change, 1_250_000.0);
        assert!((record.percent_change_held - 1.25).abs() < 1e-12);
        assert!((record.institution_share_held - 40_000_000.0).abs() < 1e-6);
        assert_eq!(record.quarter_label().as_deref(), Some("Jun 2024"));
    }

    #[test]
    fn invalid_dates_are_kept_as_none() {
        logging::set_silent(true);
        let table = RawTable::new(
            ownership_headers(false),
            vec![
                ownership_row("ACME", text("not a date"), 1.0),
                ownership_row("ACME", Data::Empty, 1.0),
            ],
        );

        let records = load_ownership(&table, "Sheet1").expect("load ownership");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|record| record.quarter_date.is_none()));
    }

    #[test]
    fn provided_share_held_column_wins() {
        logging::set_silent(true);
        let mut row = ownership_row("ACME", text("2024-06-30"), 100_000_000.0);
        row.push(Data::Float(123.0));
        let table = RawTable::new(ownership_headers(true), vec![row]);

        let records = load_ownership(&table, "Sheet1").expect("load ownership");
        assert_eq!(records[0].institution_share_held, 123.0);
    }

    fn same_value(a: f64, b: f64) -> bool {
        a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= 1e-9 * a.abs().max(1.0)
    }

    #[test]
    fn export_reload_keeps_blanks_and_derived_fields() {
        logging::set_silent(true);
        let mut unreadable_bought = ownership_row("NANB", text("2024-03-31"), 50_000_000.0);
        unreadable_bought[5] = text("N/A");
        let table = RawTable::new(
            ownership_headers(false),
            vec![
                ownership_row("ACME", text("2024-06-30"), 100_000_000.0),
                ownership_row("UNDT", text("sometime"), 100_000_000.0),
                ownership_row("ZERO", text("2024-06-30"), 0.0),
                unreadable_bought,
            ],
        );
        let records = load_ownership(&table, "Sheet1").expect("load ownership");
        assert!(records[2].percent_change_held.is_infinite());
        assert!(records[3].net_shares_change.is_nan());

        let bytes = crate::export::to_xlsx(&records).expect("export");
        let reloaded = parse_ownership_sheet(bytes, "Sheet1").expect("reload");

        assert_eq!(reloaded.len(), records.len());
        for (original, again) in records.iter().zip(&reloaded) {
            assert_eq!(original.company_symbol, again.company_symbol);
            assert_eq!(original.quarter_date, again.quarter_date);
            assert!(same_value(original.net_shares_change, again.net_shares_change));
            assert!(same_value(original.percent_change_held, again.percent_change_held));
            assert!(same_value(
                original.institution_ownership_value,
                again.institution_ownership_value
            ));
            assert!(same_value(
                original.institution_share_held,
                again.institution_share_held
            ));
        }
        assert_eq!(reloaded[1].quarter_date, None);
        assert!(reloaded[3].institution_shares_bought.is_nan());
    }

    #[test]
    fn missing_required_column_is_reported() {
        let mut headers = ownership_headers(false);
        headers.retain(|header| header != COL_FLOAT);
        let table = RawTable::new(headers, Vec::new());

        match load_ownership(&table, "Sheet1") {
            Err(DashboardError::MissingColumn { column, .. }) => assert_eq!(column, COL_FLOAT),
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn bad_holding_numbers_become_zero() {
        logging::set_silent(true);
        let table = RawTable::new(
            vec![
                COL_SYMBOL.into(),
                COL_OWNER.into(),
                "total_market_value".into(),
                "total_shares".into(),
                "share_change".into(),
            ],
            vec![vec![
                text("ACME"),
                text("Vanguard Group"),
                Data::Float(1.5e9),
                text("N/A"),
                Data::Empty,
            ]],
        );

        let records = load_holdings(&table, "Institution_Holdings").expect("load holdings");
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.total_market_value, 1.5e9);
        assert_eq!(record.total_shares, 0.0);
        assert_eq!(record.share_change, 0.0);
        assert_eq!(record.share_change_percentage, 0.0);
    }
}
