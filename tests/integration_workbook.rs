use std::fs;
use std::sync::Arc;

use ownership_dashboard::aggregate::{company_view, first_and_latest};
use ownership_dashboard::loader::parse_ownership_sheet;
use ownership_dashboard::report::{CompanyReport, Selection};
use ownership_dashboard::sample::{self, SampleSpec};
use ownership_dashboard::{export, logging, DashboardConfig, DatasetCache, OwnershipRecord};

fn spec() -> SampleSpec {
    SampleSpec {
        companies: 6,
        quarters: 4,
        seed: 42,
    }
}

fn assert_close(a: f64, b: f64) {
    if a.is_infinite() || b.is_infinite() {
        assert_eq!(a, b);
    } else if a.is_nan() || b.is_nan() {
        assert!(a.is_nan() && b.is_nan(), "{a} vs {b}");
    } else {
        assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0), "{a} vs {b}");
    }
}

fn assert_same_derived(left: &OwnershipRecord, right: &OwnershipRecord) {
    assert_eq!(left.company_symbol, right.company_symbol);
    assert_eq!(left.quarter_date, right.quarter_date);
    assert_close(left.net_shares_change, right.net_shares_change);
    assert_close(left.percent_change_held, right.percent_change_held);
    assert_close(left.institution_ownership_value, right.institution_ownership_value);
    assert_close(left.institution_share_held, right.institution_share_held);
}

#[test]
fn sample_workbook_loads_with_derived_fields() {
    logging::set_silent(true);
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ownership_data.xlsx");
    sample::write_sample(spec(), &path).expect("write sample");

    let config = DashboardConfig {
        source_path: path,
        ..DashboardConfig::default()
    };
    let mut cache = DatasetCache::new();
    let dataset = cache.load(&config).expect("load workbook");
    let expected = sample::dataset(spec());

    assert_eq!(dataset.ownership.len(), expected.ownership.len());
    assert_eq!(dataset.holdings.len(), expected.holdings.len());
    for (loaded, generated) in dataset.ownership.iter().zip(&expected.ownership) {
        assert_same_derived(loaded, generated);
        assert_eq!(
            loaded.net_shares_change,
            loaded.institution_shares_bought - loaded.institution_shares_sold
        );
    }
    // "N/A" placeholders in the holdings sheet come back as zero.
    for (loaded, generated) in dataset.holdings.iter().zip(&expected.holdings) {
        assert_eq!(loaded.owner_name, generated.owner_name);
        assert_close(loaded.total_shares, generated.total_shares);
        assert_close(loaded.share_change, generated.share_change);
        assert_close(loaded.share_change_percentage, generated.share_change_percentage);
    }

    let view = company_view(&dataset.ownership, "TEC000");
    let (first, latest) = first_and_latest(&view).expect("dated rows");
    assert!(first.quarter_date < latest.quarter_date);
}

#[test]
fn cache_reuses_unchanged_workbooks() {
    logging::set_silent(true);
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ownership_data.xlsx");
    sample::write_sample(spec(), &path).expect("write sample");
    let config = DashboardConfig {
        source_path: path.clone(),
        ..DashboardConfig::default()
    };

    let mut cache = DatasetCache::new();
    let first = cache.load(&config).expect("first load");
    let second = cache.load(&config).expect("second load");
    assert!(Arc::ptr_eq(&first, &second), "unchanged file should hit cache");

    let changed = SampleSpec {
        seed: 7,
        ..spec()
    };
    sample::write_sample(changed, &path).expect("rewrite sample");
    let third = cache.load(&config).expect("third load");
    assert!(!Arc::ptr_eq(&first, &third), "changed content should re-parse");
    assert_eq!(cache.len(), 1);
}

#[test]
fn export_round_trip_preserves_derived_fields() {
    logging::set_silent(true);
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("ownership_data.xlsx");
    let exported = dir.path().join("processed_ownership_data.xlsx");
    sample::write_sample(spec(), &source).expect("write sample");

    let config = DashboardConfig {
        source_path: source,
        ..DashboardConfig::default()
    };
    let dataset = DatasetCache::new().load(&config).expect("load");
    export::write_workbook(&dataset.ownership, &exported).expect("export");

    let bytes = fs::read(&exported).expect("read export");
    let reloaded = parse_ownership_sheet(bytes, &config.ownership_sheet).expect("reload");

    assert_eq!(reloaded.len(), dataset.ownership.len());
    for (original, again) in dataset.ownership.iter().zip(&reloaded) {
        assert_same_derived(original, again);
    }
}

#[test]
fn report_over_loaded_sample() {
    logging::set_silent(true);
    let dataset = sample::dataset(spec());
    let selection = Selection::first_company(&dataset).expect("companies");
    let report = CompanyReport::build(&dataset, &selection, 10)
        .expect("build")
        .expect("non-empty");

    assert_eq!(report.trend.len(), 4);
    assert_eq!(report.top_institutions.len(), 10);
    assert!(report
        .top_institutions
        .windows(2)
        .all(|pair| pair[0].total_shares >= pair[1].total_shares));
    assert!(report
        .peers
        .iter()
        .all(|peer| peer.industry == report.industry && peer.company_symbol != report.company));
    assert_eq!(report.industry_leaders.len(), 6);
}
