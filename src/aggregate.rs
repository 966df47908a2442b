//! Pure filtering, grouping and ranking helpers over loaded snapshots.
//!
//! Records without a valid quarter date never take part in an operation that
//! orders by date.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::model::{CompanyKeyed, NumericColumn, OwnershipRecord};

/// Records of one company, input order preserved.
pub fn filter_by_company<R>(records: &[R], symbol: &str) -> Vec<R>
where
    R: CompanyKeyed + Clone,
{
    records
        .iter()
        .filter(|record| record.company_symbol() == symbol)
        .cloned()
        .collect()
}

/// Records whose quarter label is one of `selected`.
pub fn filter_by_quarters<S>(records: &[OwnershipRecord], selected: &[S]) -> Vec<OwnershipRecord>
where
    S: AsRef<str>,
{
    let selected: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
    records
        .iter()
        .filter(|record| {
            record
                .quarter_label()
                .is_some_and(|label| selected.contains(label.as_str()))
        })
        .cloned()
        .collect()
}

/// Dated records in ascending quarter order; equal dates keep input order.
pub fn sort_by_quarter(records: &[OwnershipRecord]) -> Vec<OwnershipRecord> {
    let mut dated: Vec<OwnershipRecord> = records
        .iter()
        .filter(|record| record.quarter_date.is_some())
        .cloned()
        .collect();
    dated.sort_by_key(|record| record.quarter_date);
    dated
}

/// A company's dated records sorted by quarter.
pub fn company_view(records: &[OwnershipRecord], symbol: &str) -> Vec<OwnershipRecord> {
    sort_by_quarter(&filter_by_company(records, symbol))
}

/// Distinct symbols in the order they first appear.
pub fn company_symbols(records: &[OwnershipRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.company_symbol.as_str()))
        .map(|record| record.company_symbol.clone())
        .collect()
}

/// Distinct quarter labels in date order.
pub fn quarter_labels(records: &[OwnershipRecord]) -> Vec<String> {
    let mut labels: Vec<String> = sort_by_quarter(records)
        .iter()
        .filter_map(OwnershipRecord::quarter_label)
        .collect();
    labels.dedup();
    labels
}

/// Earliest and latest dated records. `None` when nothing is dated.
pub fn first_and_latest(
    records: &[OwnershipRecord],
) -> Option<(&OwnershipRecord, &OwnershipRecord)> {
    let dated = || records.iter().filter(|record| record.quarter_date.is_some());
    let first = dated().min_by_key(|record| record.quarter_date)?;
    let latest = dated().max_by_key(|record| record.quarter_date)?;
    Some((first, latest))
}

/// Stable sort on a numeric column, returning at most `n` records.
/// `NaN` values sort last in either direction.
pub fn top_n_by_column<R, C>(records: &[R], column: C, n: usize, ascending: bool) -> Vec<R>
where
    R: Clone,
    C: NumericColumn<R>,
{
    let mut ranked: Vec<R> = records.to_vec();
    ranked.sort_by(|a, b| compare_values(column.value(a), column.value(b), ascending));
    ranked.truncate(n);
    ranked
}

fn compare_values(a: f64, b: f64, ascending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        }
    }
}

/// The most recent record of each company, ordered by symbol.
/// On equal dates the record seen first wins.
pub fn latest_per_company(records: &[OwnershipRecord]) -> Vec<OwnershipRecord> {
    let mut latest: BTreeMap<&str, &OwnershipRecord> = BTreeMap::new();
    for record in records.iter().filter(|record| record.quarter_date.is_some()) {
        latest
            .entry(record.company_symbol.as_str())
            .and_modify(|current| {
                if record.quarter_date > current.quarter_date {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    latest.into_values().cloned().collect()
}

/// Latest record of every other company in `industry`.
pub fn peers_by_industry(
    records: &[OwnershipRecord],
    industry: &str,
    exclude_symbol: &str,
) -> Vec<OwnershipRecord> {
    let peers: Vec<OwnershipRecord> = records
        .iter()
        .filter(|record| record.industry == industry && record.company_symbol != exclude_symbol)
        .cloned()
        .collect();
    latest_per_company(&peers)
}

/// `x` in millions rounded to two decimals, ties to even.
/// Non-finite input passes through.
pub fn to_millions(x: f64) -> f64 {
    (x / 1_000_000.0 * 100.0).round_ties_even() / 100.0
}
