use std::path::PathBuf;

use crate::constants::{EXPORT_PATH, HOLDINGS_SHEET, OWNERSHIP_SHEET, SOURCE_PATH, TOP_N};

/// Where the dashboard reads its workbook from and where exports land.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub source_path: PathBuf,
    pub ownership_sheet: String,
    pub holdings_sheet: String,
    pub export_path: PathBuf,
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(SOURCE_PATH),
            ownership_sheet: OWNERSHIP_SHEET.to_string(),
            holdings_sheet: HOLDINGS_SHEET.to_string(),
            export_path: PathBuf::from(EXPORT_PATH),
            top_n: TOP_N,
        }
    }
}
