use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::json;

use crate::aggregate::{
    company_symbols, company_view, filter_by_company, filter_by_quarters, first_and_latest,
    latest_per_company, peers_by_industry, top_n_by_column,
};
use crate::error::{DashboardError, Result};
use crate::loader::Dataset;
use crate::logging;
use crate::model::{HoldingColumn, InstitutionHoldingRecord, OwnershipColumn, OwnershipRecord};

/// What the user picked: one company and, optionally, a subset of its quarters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub company: String,
    /// `None` selects every quarter of the company.
    pub quarters: Option<Vec<String>>,
}

impl Selection {
    pub fn company(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            quarters: None,
        }
    }

    /// Selection of the first known company, the selector's default.
    pub fn first_company(dataset: &Dataset) -> Option<Self> {
        company_symbols(&dataset.ownership)
            .into_iter()
            .next()
            .map(Self::company)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            other => Err(format!("unknown chart type {other:?}, expected bar or pie")),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Bar => "Bar",
            ChartKind::Pie => "Pie",
        })
    }
}

/// Figures of the latest selected quarter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub quarter: String,
    pub percent_held: f64,
    pub shares_held: f64,
    /// Shares held now minus shares held in the first selected quarter.
    pub net_share_change: f64,
    pub holders: f64,
    pub shares_bought: f64,
    pub shares_sold: f64,
    pub share_float: f64,
    pub shares_outstanding: f64,
}

/// Latest minus first selected quarter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterChanges {
    pub from_quarter: String,
    pub to_quarter: String,
    pub percent_held: f64,
    pub shares_held: f64,
    pub holders: f64,
    pub shares_bought: f64,
    pub shares_sold: f64,
    pub share_float: f64,
    pub shares_outstanding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub quarter: String,
    pub percent_held: f64,
    pub shares_held: f64,
    pub net_shares_change: f64,
    /// Change of `net_shares_change` against the previous selected quarter.
    pub net_change_diff: f64,
    pub holders: f64,
}

/// Institution's slice of the top-N total, for the pie rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingShare {
    pub owner_name: String,
    pub total_shares: f64,
    pub fraction: f64,
}

/// Everything one dashboard interaction shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyReport {
    pub company: String,
    pub company_name: String,
    pub industry: String,
    pub key_metrics: KeyMetrics,
    pub changes: QuarterChanges,
    pub trend: Vec<TrendPoint>,
    pub top_institutions: Vec<InstitutionHoldingRecord>,
    pub peers: Vec<OwnershipRecord>,
    pub industry_leaders: Vec<OwnershipRecord>,
}

impl CompanyReport {
    /// Build every view for `selection`.
    ///
    /// Returns `Ok(None)` when the selection leaves no rows; callers warn and
    /// skip rendering.
    pub fn build(dataset: &Dataset, selection: &Selection, top_n: usize) -> Result<Option<Self>> {
        let company = selection.company.as_str();
        if !dataset
            .ownership
            .iter()
            .any(|record| record.company_symbol == company)
        {
            return Err(DashboardError::UnknownCompany(company.to_string()));
        }

        let view = company_view(&dataset.ownership, company);
        let view = match &selection.quarters {
            Some(quarters) => filter_by_quarters(&view, quarters),
            None => view,
        };

        let Some((first, latest)) = first_and_latest(&view) else {
            logging::warn(
                "report.empty",
                "No data available for selected filters",
                json!({ "company": company, "quarters": selection.quarters }),
            );
            return Ok(None);
        };

        let institutions = filter_by_company(&dataset.holdings, company);
        let top_institutions =
            top_n_by_column(&institutions, HoldingColumn::TotalShares, top_n, false);

        let peers = top_n_by_column(
            &peers_by_industry(&dataset.ownership, &latest.industry, company),
            OwnershipColumn::InstitutionPercentHeld,
            top_n,
            false,
        );
        let industry_leaders = top_n_by_column(
            &latest_per_company(&dataset.ownership),
            OwnershipColumn::InstitutionPercentHeld,
            top_n,
            false,
        );

        Ok(Some(Self {
            company: company.to_string(),
            company_name: latest.company_name.clone(),
            industry: latest.industry.clone(),
            key_metrics: key_metrics(first, latest),
            changes: quarter_changes(first, latest),
            trend: trend(&view),
            top_institutions,
            peers,
            industry_leaders,
        }))
    }

    /// Top institutions as fractions of their combined holding.
    pub fn holding_shares(&self) -> Vec<HoldingShare> {
        let total: f64 = self
            .top_institutions
            .iter()
            .map(|holding| holding.total_shares)
            .sum();
        self.top_institutions
            .iter()
            .map(|holding| HoldingShare {
                owner_name: holding.owner_name.clone(),
                total_shares: holding.total_shares,
                fraction: if total > 0.0 {
                    holding.total_shares / total
                } else {
                    0.0
                },
            })
            .collect()
    }
}

fn label(record: &OwnershipRecord) -> String {
    record.quarter_label().unwrap_or_default()
}

fn key_metrics(first: &OwnershipRecord, latest: &OwnershipRecord) -> KeyMetrics {
    KeyMetrics {
        quarter: label(latest),
        percent_held: latest.institution_percent_held,
        shares_held: latest.institution_share_held,
        net_share_change: latest.institution_share_held - first.institution_share_held,
        holders: latest.institution_holder_number,
        shares_bought: latest.institution_shares_bought,
        shares_sold: latest.institution_shares_sold,
        share_float: latest.share_float,
        shares_outstanding: latest.total_shares_outstanding,
    }
}

fn quarter_changes(first: &OwnershipRecord, latest: &OwnershipRecord) -> QuarterChanges {
    QuarterChanges {
        from_quarter: label(first),
        to_quarter: label(latest),
        percent_held: latest.institution_percent_held - first.institution_percent_held,
        shares_held: latest.institution_share_held - first.institution_share_held,
        holders: latest.institution_holder_number - first.institution_holder_number,
        shares_bought: latest.institution_shares_bought - first.institution_shares_bought,
        shares_sold: latest.institution_shares_sold - first.institution_shares_sold,
        share_float: latest.share_float - first.share_float,
        shares_outstanding: latest.total_shares_outstanding - first.total_shares_outstanding,
    }
}

fn trend(view: &[OwnershipRecord]) -> Vec<TrendPoint> {
    let mut previous: Option<f64> = None;
    view.iter()
        .map(|record| {
            let net_change_diff = previous
                .map(|prev| record.net_shares_change - prev)
                .filter(|diff| !diff.is_nan())
                .unwrap_or(0.0);
            previous = Some(record.net_shares_change);
            TrendPoint {
                quarter: label(record),
                percent_held: record.institution_percent_held,
                shares_held: record.institution_share_held,
                net_shares_change: record.net_shares_change,
                net_change_diff,
                holders: record.institution_holder_number,
            }
        })
        .collect()
}
