use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("source workbook not found at {0:?}")]
    SourceMissing(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("sheet {0:?} not found in workbook")]
    SheetMissing(String),
    #[error("sheet {sheet:?} is missing required column {column:?}")]
    MissingColumn { sheet: String, column: String },
    #[error("unknown company symbol {0:?}")]
    UnknownCompany(String),
    #[error("failed to write workbook: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
