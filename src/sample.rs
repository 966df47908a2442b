//! Deterministic synthetic ownership workbooks for demos, tests and benchmarks.

use std::path::Path;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::json;

use crate::constants::{HOLDINGS_SHEET, OWNERSHIP_SHEET};
use crate::error::Result;
use crate::loader::{
    date_to_serial, Dataset, COL_FLOAT, COL_HOLDERS, COL_INDUSTRY, COL_NAME, COL_OUTSTANDING,
    COL_OWNER, COL_PERCENT_HELD, COL_QUARTER, COL_SHARES_BOUGHT, COL_SHARES_SOLD, COL_SYMBOL,
};
use crate::logging;
use crate::model::{HoldingColumn, InstitutionHoldingRecord, OwnershipInput, OwnershipRecord};

const INDUSTRIES: [(&str, &str); 5] = [
    ("TEC", "Technology"),
    ("FIN", "Financials"),
    ("HLT", "Healthcare"),
    ("ENG", "Energy"),
    ("IND", "Industrials"),
];

const INSTITUTIONS: [&str; 12] = [
    "Vanguard Group Inc",
    "BlackRock Inc",
    "State Street Corp",
    "Fidelity Management & Research",
    "Geode Capital Management",
    "Capital Research Global Investors",
    "T. Rowe Price Associates",
    "Northern Trust Corp",
    "Morgan Stanley",
    "JPMorgan Chase & Co",
    "Wellington Management Group",
    "Invesco Ltd",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSpec {
    pub companies: usize,
    pub quarters: usize,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            companies: 25,
            quarters: 8,
            seed: 0xBADF00D,
        }
    }
}

/// One generated holdings row; `share_change_missing` rows get an `N/A`
/// placeholder in the sheet instead of a number.
struct HoldingRow {
    record: InstitutionHoldingRecord,
    share_change_missing: bool,
}

struct Sample {
    ownership: Vec<OwnershipInput>,
    holdings: Vec<HoldingRow>,
}

/// Quarter-end date of the `index`-th quarter counted from Q1 2023.
fn quarter_end(index: usize) -> Option<NaiveDate> {
    let year = 2023 + (index / 4) as i32;
    let month = 3 * (index % 4) as u32 + 3;
    let day = if month == 6 || month == 9 { 30 } else { 31 };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn generate(spec: SampleSpec) -> Sample {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let mut ownership = Vec::with_capacity(spec.companies * spec.quarters);
    let mut holdings = Vec::new();

    for company in 0..spec.companies {
        let (prefix, industry) = INDUSTRIES[company % INDUSTRIES.len()];
        let symbol = format!("{prefix}{company:03}");
        let company_name = format!("{industry} Holdings {company:03}");

        let outstanding: f64 = rng.gen_range(50.0e6..2.0e9_f64).round();
        let mut percent_held: f64 = rng.gen_range(30.0..85.0);
        let mut holders: f64 = rng.gen_range(200.0..3_000.0_f64).round();

        for quarter in 0..spec.quarters {
            percent_held = (percent_held + rng.gen_range(-3.0..3.0)).clamp(0.0, 100.0);
            holders = (holders + rng.gen_range(-40.0..60.0_f64).round()).max(1.0);
            ownership.push(OwnershipInput {
                company_symbol: symbol.clone(),
                company_name: company_name.clone(),
                industry: industry.to_string(),
                quarter_date: quarter_end(quarter),
                institution_percent_held: (percent_held * 100.0).round() / 100.0,
                institution_shares_bought: (outstanding * rng.gen_range(0.0..0.03)).round(),
                institution_shares_sold: (outstanding * rng.gen_range(0.0..0.03)).round(),
                total_shares_outstanding: outstanding,
                share_float: (outstanding * rng.gen_range(0.8..0.98)).round(),
                institution_holder_number: holders,
                institution_share_held: None,
            });
        }

        let held = outstanding * percent_held / 100.0;
        let price: f64 = rng.gen_range(10.0..400.0);
        for owner in INSTITUTIONS {
            let total_shares = (held * rng.gen_range(0.005..0.09)).round();
            let share_change = (total_shares * rng.gen_range(-0.1..0.1)).round();
            holdings.push(HoldingRow {
                record: InstitutionHoldingRecord {
                    company_symbol: symbol.clone(),
                    owner_name: owner.to_string(),
                    total_market_value: (total_shares * price).round(),
                    total_shares,
                    share_change,
                    share_change_percentage: if total_shares > 0.0 {
                        share_change / total_shares * 100.0
                    } else {
                        0.0
                    },
                },
                share_change_missing: rng.gen_bool(0.05),
            });
        }
    }

    Sample {
        ownership,
        holdings,
    }
}

/// The dataset a loader would produce from [`write_sample`]'s workbook.
pub fn dataset(spec: SampleSpec) -> Dataset {
    let sample = generate(spec);
    Dataset {
        ownership: sample
            .ownership
            .into_iter()
            .map(OwnershipRecord::derive)
            .collect(),
        holdings: sample
            .holdings
            .into_iter()
            .map(|row| {
                let mut record = row.record;
                if row.share_change_missing {
                    record.share_change = 0.0;
                }
                record
            })
            .collect(),
    }
}

/// Write a source workbook with both sheets in the layout the loader expects.
pub fn write_sample(spec: SampleSpec, path: &Path) -> Result<()> {
    let sample = generate(spec);
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let sheet = workbook.add_worksheet();
    sheet.set_name(OWNERSHIP_SHEET)?;
    let headers = [
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
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (idx, input) in sample.ownership.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, &input.company_symbol)?;
        sheet.write_string(row, 1, &input.company_name)?;
        sheet.write_string(row, 2, &input.industry)?;
        if let Some(date) = input.quarter_date {
            sheet.write_number_with_format(row, 3, date_to_serial(date), &date_format)?;
        }
        sheet.write_number(row, 4, input.institution_percent_held)?;
        sheet.write_number(row, 5, input.institution_shares_bought)?;
        sheet.write_number(row, 6, input.institution_shares_sold)?;
        sheet.write_number(row, 7, input.total_shares_outstanding)?;
        sheet.write_number(row, 8, input.share_float)?;
        sheet.write_number(row, 9, input.institution_holder_number)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(HOLDINGS_SHEET)?;
    sheet.write_string(0, 0, COL_SYMBOL)?;
    sheet.write_string(0, 1, COL_OWNER)?;
    for (offset, column) in HoldingColumn::ALL.iter().enumerate() {
        sheet.write_string(0, offset as u16 + 2, column.header())?;
    }
    for (idx, row) in sample.holdings.iter().enumerate() {
        let line = idx as u32 + 1;
        let record = &row.record;
        sheet.write_string(line, 0, &record.company_symbol)?;
        sheet.write_string(line, 1, &record.owner_name)?;
        sheet.write_number(line, 2, record.total_market_value)?;
        sheet.write_number(line, 3, record.total_shares)?;
        if row.share_change_missing {
            sheet.write_string(line, 4, "N/A")?;
        } else {
            sheet.write_number(line, 4, record.share_change)?;
        }
        sheet.write_number(line, 5, record.share_change_percentage)?;
    }

    workbook.save(path)?;
    logging::info(
        "sample.write",
        "Sample ownership workbook written",
        json!({
            "path": path.display().to_string(),
            "companies": spec.companies,
            "quarters": spec.quarters,
            "seed": spec.seed,
        }),
    );
    Ok(())
}
