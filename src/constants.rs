pub const SOURCE_PATH: &str = "ownership_data.xlsx";
pub const OWNERSHIP_SHEET: &str = "Sheet1";
pub const HOLDINGS_SHEET: &str = "Institution_Holdings";
pub const EXPORT_PATH: &str = "processed_ownership_data.xlsx";
pub const EXPORT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const TOP_N: usize = 10;
pub const QUARTER_LABEL_FORMAT: &str = "%b %Y";
