//! Institutional ownership reporting over a spreadsheet source.
//!
//! [`loader`] turns the workbook into typed snapshots, [`aggregate`] holds the
//! pure filtering and ranking helpers, and [`report`] assembles the views a
//! front end renders.

pub mod aggregate;
pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod format;
pub mod loader;
pub mod logging;
pub mod model;
pub mod report;
pub mod sample;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use loader::{Dataset, DatasetCache};
pub use model::{InstitutionHoldingRecord, OwnershipRecord};
pub use report::{CompanyReport, Selection};
