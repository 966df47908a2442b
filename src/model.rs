use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::QUARTER_LABEL_FORMAT;

/// One company's institutional ownership snapshot for one reporting quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub company_symbol: String,
    pub company_name: String,
    pub industry: String,
    /// `None` when the source value could not be read as a date.
    pub quarter_date: Option<NaiveDate>,
    pub institution_percent_held: f64,
    pub institution_shares_bought: f64,
    pub institution_shares_sold: f64,
    pub total_shares_outstanding: f64,
    pub share_float: f64,
    pub institution_holder_number: f64,
    pub net_shares_change: f64,
    pub percent_change_held: f64,
    pub institution_ownership_value: f64,
    pub institution_share_held: f64,
}

/// Raw columns of an ownership row, before any derived field exists.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipInput {
    pub company_symbol: String,
    pub company_name: String,
    pub industry: String,
    pub quarter_date: Option<NaiveDate>,
    pub institution_percent_held: f64,
    pub institution_shares_bought: f64,
    pub institution_shares_sold: f64,
    pub total_shares_outstanding: f64,
    pub share_float: f64,
    pub institution_holder_number: f64,
    /// Trusted as-is when the source carries the column.
    pub institution_share_held: Option<f64>,
}

impl OwnershipRecord {
    pub fn derive(input: OwnershipInput) -> Self {
        let net_shares_change = input.institution_shares_bought - input.institution_shares_sold;
        let percent_change_held = net_shares_change / input.total_shares_outstanding * 100.0;
        let institution_ownership_value =
            input.institution_percent_held / 100.0 * input.total_shares_outstanding;
        let institution_share_held = input
            .institution_share_held
            .unwrap_or(institution_ownership_value);

        Self {
            company_symbol: input.company_symbol,
            company_name: input.company_name,
            industry: input.industry,
            quarter_date: input.quarter_date,
            institution_percent_held: input.institution_percent_held,
            institution_shares_bought: input.institution_shares_bought,
            institution_shares_sold: input.institution_shares_sold,
            total_shares_outstanding: input.total_shares_outstanding,
            share_float: input.share_float,
            institution_holder_number: input.institution_holder_number,
            net_shares_change,
            percent_change_held,
            institution_ownership_value,
            institution_share_held,
        }
    }

    /// Quarter formatted the way the quarter selector shows it, e.g. `Mar 2024`.
    pub fn quarter_label(&self) -> Option<String> {
        self.quarter_date
            .map(|date| date.format(QUARTER_LABEL_FORMAT).to_string())
    }
}

/// A single institution's position in one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionHoldingRecord {
    pub company_symbol: String,
    pub owner_name: String,
    pub total_market_value: f64,
    pub total_shares: f64,
    pub share_change: f64,
    pub share_change_percentage: f64,
}

/// Records that belong to one company.
pub trait CompanyKeyed {
    fn company_symbol(&self) -> &str;
}

impl CompanyKeyed for OwnershipRecord {
    fn company_symbol(&self) -> &str {
        &self.company_symbol
    }
}

impl CompanyKeyed for InstitutionHoldingRecord {
    fn company_symbol(&self) -> &str {
        &self.company_symbol
    }
}

/// A numeric column usable as a ranking key for records of type `R`.
pub trait NumericColumn<R>: Copy {
    fn value(self, record: &R) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipColumn {
    InstitutionPercentHeld,
    InstitutionShareHeld,
    InstitutionHolderNumber,
    NetSharesChange,
    PercentChangeHeld,
    ShareFloat,
    TotalSharesOutstanding,
}

impl NumericColumn<OwnershipRecord> for OwnershipColumn {
    fn value(self, record: &OwnershipRecord) -> f64 {
        match self {
            OwnershipColumn::InstitutionPercentHeld => record.institution_percent_held,
            OwnershipColumn::InstitutionShareHeld => record.institution_share_held,
            OwnershipColumn::InstitutionHolderNumber => record.institution_holder_number,
            OwnershipColumn::NetSharesChange => record.net_shares_change,
            OwnershipColumn::PercentChangeHeld => record.percent_change_held,
            OwnershipColumn::ShareFloat => record.share_float,
            OwnershipColumn::TotalSharesOutstanding => record.total_shares_outstanding,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingColumn {
    TotalMarketValue,
    TotalShares,
    ShareChange,
    ShareChangePercentage,
}

impl HoldingColumn {
    pub const ALL: [HoldingColumn; 4] = [
        HoldingColumn::TotalMarketValue,
        HoldingColumn::TotalShares,
        HoldingColumn::ShareChange,
        HoldingColumn::ShareChangePercentage,
    ];

    /// Header of the column in the holdings sheet.
    pub fn header(self) -> &'static str {
        match self {
            HoldingColumn::TotalMarketValue => "total_market_value",
            HoldingColumn::TotalShares => "total_shares",
            HoldingColumn::ShareChange => "share_change",
            HoldingColumn::ShareChangePercentage => "share_change_percentage",
        }
    }
}

impl NumericColumn<InstitutionHoldingRecord> for HoldingColumn {
    fn value(self, record: &InstitutionHoldingRecord) -> f64 {
        match self {
            HoldingColumn::TotalMarketValue => record.total_market_value,
            HoldingColumn::TotalShares => record.total_shares,
            HoldingColumn::ShareChange => record.share_change,
            HoldingColumn::ShareChangePercentage => record.share_change_percentage,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn input(outstanding: f64, provided: Option<f64>) -> OwnershipInput {
        OwnershipInput {
            company_symbol: "ACME".into(),
            company_name: "Acme Corp".into(),
            industry: "Industrials".into(),
            quarter_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            institution_percent_held: 62.5,
            institution_shares_bought: 3_000_000.0,
            institution_shares_sold: 4_250_000.0,
            total_shares_outstanding: outstanding,
            share_float: 150_000_000.0,
            institution_holder_number: 845.0,
            institution_share_held: provided,
        }
    }

    #[test]
    fn derives_net_change_and_percentages() {
        let record = OwnershipRecord::derive(input(200_000_000.0, None));

        assert_eq!(record.net_shares_change, -1_250_000.0);
        assert!((record.percent_change_held - (-0.625)).abs() < 1e-12);
        assert!((record.institution_ownership_value - 125_000_000.0).abs() < 1e-6);
        assert_eq!(record.institution_share_held, record.institution_ownership_value);
    }

    #[test]
    fn provided_share_held_is_trusted() {
        let record = OwnershipRecord::derive(input(200_000_000.0, Some(1.0)));
        assert_eq!(record.institution_share_held, 1.0);
        assert!((record.institution_ownership_value - 125_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn zero_outstanding_yields_non_finite_change() {
        let record = OwnershipRecord::derive(input(0.0, None));
        assert!(!record.percent_change_held.is_finite());
        assert_eq!(record.institution_ownership_value, 0.0);
    }

    #[test]
    fn quarter_label_uses_short_month() {
        let record = OwnershipRecord::derive(input(1.0, None));
        assert_eq!(record.quarter_label().as_deref(), Some("Mar 2024"));

        let mut undated = input(1.0, None);
        undated.quarter_date = None;
        assert_eq!(OwnershipRecord::derive(undated).quarter_label(), None);
    }
}
