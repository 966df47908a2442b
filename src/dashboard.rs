//! Terminal front end: one function per CLI command.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;

use crate::aggregate::{company_symbols, company_view, quarter_labels};
use crate::chart::{self, ChartSize};
use crate::cli::{ExportArgs, ReportArgs, SampleArgs};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::export;
use crate::format;
use crate::loader::{Dataset, DatasetCache};
use crate::logging;
use crate::model::OwnershipRecord;
use crate::report::{ChartKind, CompanyReport, Selection, TrendPoint};
use crate::sample;

fn load(cache: &mut DatasetCache, config: &DashboardConfig) -> Result<Arc<Dataset>> {
    cache.load(config).map_err(|err| {
        if let DashboardError::SourceMissing(path) = &err {
            logging::error(
                "source.missing",
                "Excel file not found, please check the file name",
                json!({ "path": path.display().to_string() }),
            );
        }
        err.into()
    })
}

pub fn report(config: &DashboardConfig, args: &ReportArgs) -> Result<()> {
    if args.json {
        logging::set_stderr_only(true);
    }
    let mut cache = DatasetCache::new();
    let dataset = load(&mut cache, config)?;

    let selection = match &args.company {
        Some(company) => Selection::company(company.clone()),
        None => Selection::first_company(&dataset).context("workbook has no ownership rows")?,
    };
    let selection = Selection {
        quarters: (!args.quarters.is_empty()).then(|| args.quarters.clone()),
        ..selection
    };

    let top_n = args.top.unwrap_or(config.top_n);
    let Some(report) = CompanyReport::build(&dataset, &selection, top_n)? else {
        if args.json {
            println!("null");
            return Ok(());
        }
        println!("No data available for selected filters.");
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_metrics(&report);
    print_trends(&report, args.chart_size());
    print_institutions(&report, args.chart, args.chart_size());
    print_ranking(&format!("Peers in {}", report.industry), &report.peers);
    print_ranking(
        "Top companies by institution % held (latest quarter)",
        &report.industry_leaders,
    );
    Ok(())
}

fn print_metrics(report: &CompanyReport) {
    let metrics = &report.key_metrics;
    let changes = &report.changes;

    println!(
        "{} ({}) | {} | latest quarter {}",
        report.company, report.company_name, report.industry, metrics.quarter
    );
    println!();
    println!("Key metrics");
    let rows = [
        ("Institution % Held", format::percent(metrics.percent_held)),
        ("Institution Shares Held", format::millions(metrics.shares_held)),
        ("Net Share Change", format::signed_millions(metrics.net_share_change)),
        ("Institution Holders", format::count(metrics.holders)),
        ("Shares Bought (Q)", format::millions(metrics.shares_bought)),
        ("Shares Sold (Q)", format::millions(metrics.shares_sold)),
        ("Share Float", format::millions(metrics.share_float)),
        ("Shares Outstanding", format::millions(metrics.shares_outstanding)),
    ];
    for (label, value) in rows {
        println!("  {label:<28} {value:>16}");
    }

    println!();
    println!(
        "Change between {} and {}",
        changes.from_quarter, changes.to_quarter
    );
    let rows = [
        ("Change in % Held", format::signed_percent(changes.percent_held)),
        ("Change in Shares Held", format::signed_millions(changes.shares_held)),
        ("Change in Holders", format::signed_count(changes.holders)),
        ("Change in Shares Bought", format::signed_millions(changes.shares_bought)),
        ("Change in Shares Sold", format::signed_millions(changes.shares_sold)),
        ("Change in Float", format::signed_millions(changes.share_float)),
        ("Change in Shares Outstanding", format::signed_millions(changes.shares_outstanding)),
    ];
    for (label, value) in rows {
        println!("  {label:<28} {value:>16}");
    }
    println!();
}

fn print_trends(report: &CompanyReport, size: ChartSize) {
    let series = |value: fn(&TrendPoint) -> f64| -> Vec<(String, f64)> {
        report
            .trend
            .iter()
            .map(|point| (point.quarter.clone(), value(point)))
            .collect()
    };

    chart::render_line(
        "Institution ownership over time (% held)",
        &series(|point| point.percent_held),
        size,
    );
    chart::render_bars(
        "Net shares change per quarter",
        &series(|point| point.net_shares_change),
        size,
    );
    chart::render_line(
        "Institution holder count over time",
        &series(|point| point.holders),
        size,
    );

    println!(
        "{:>10} | {:>8} | {:>16} | {:>16} | {:>16} | {:>8}",
        "Quarter", "% Held", "Shares Held", "Net Change", "Net Chg Diff", "Holders"
    );
    for point in &report.trend {
        println!(
            "{:>10} | {:>8} | {:>16} | {:>16} | {:>16} | {:>8}",
            point.quarter,
            format::percent(point.percent_held),
            format::millions(point.shares_held),
            format::signed_millions(point.net_shares_change),
            format::signed_millions(point.net_change_diff),
            format::count(point.holders),
        );
    }
    println!();
}

fn print_institutions(report: &CompanyReport, kind: ChartKind, size: ChartSize) {
    println!("Top {} institutions holding shares", report.top_institutions.len());
    if report.top_institutions.is_empty() {
        logging::warn(
            "report.no_institutions",
            "No institutional data available for this company",
            json!({ "company": report.company }),
        );
        println!("No institutional data available for this company.");
        println!();
        return;
    }

    match kind {
        ChartKind::Bar => {
            let points: Vec<(String, f64)> = report
                .top_institutions
                .iter()
                .map(|holding| (holding.owner_name.clone(), holding.total_shares))
                .collect();
            chart::render_bars(
                &format!("Top institutions holding shares of {}", report.company),
                &points,
                size,
            );
        }
        ChartKind::Pie => {
            println!("{}", chart::pie_breakdown(&report.holding_shares()));
            println!();
        }
    }

    println!(
        "{:<36} | {:>16} | {:>16} | {:>14} | {:>8}",
        "Institution", "Market Value", "Shares", "Share Change", "Change %"
    );
    for holding in &report.top_institutions {
        println!(
            "{:<36} | {:>16} | {:>16} | {:>14} | {:>8}",
            holding.owner_name,
            format::millions(holding.total_market_value),
            format::count(holding.total_shares),
            format::signed_count(holding.share_change),
            format::signed_percent(holding.share_change_percentage),
        );
    }
    println!();
}

fn print_ranking(title: &str, records: &[OwnershipRecord]) {
    println!("{title}");
    if records.is_empty() {
        println!("  (none)");
        println!();
        return;
    }
    println!(
        "{:<8} | {:<32} | {:>8} | {:>14} | {:>8} | {:>12} | {:<16} | {:>8}",
        "Symbol", "Name", "% Held", "Shares Held", "Holders", "Float", "Industry", "Quarter"
    );
    for record in records {
        println!(
            "{:<8} | {:<32} | {:>8} | {:>14} | {:>8} | {:>12} | {:<16} | {:>8}",
            record.company_symbol,
            record.company_name,
            format::percent(record.institution_percent_held),
            format::millions(record.institution_share_held),
            format::count(record.institution_holder_number),
            format::millions(record.share_float),
            record.industry,
            record.quarter_label().unwrap_or_default(),
        );
    }
    println!();
}

pub fn companies(config: &DashboardConfig) -> Result<()> {
    let mut cache = DatasetCache::new();
    let dataset = load(&mut cache, config)?;

    for symbol in company_symbols(&dataset.ownership) {
        let labels = quarter_labels(&company_view(&dataset.ownership, &symbol));
        println!("{symbol:<10} {}", labels.join(", "));
    }
    Ok(())
}

pub fn export(config: &DashboardConfig, args: &ExportArgs) -> Result<()> {
    let mut cache = DatasetCache::new();
    let dataset = load(&mut cache, config)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.export_path.clone());
    export::write_workbook(&dataset.ownership, &output)
        .with_context(|| format!("failed to export to {:?}", output))?;
    println!(
        "Wrote {} rows to {} ({})",
        dataset.ownership.len(),
        output.display(),
        export::EXPORT_MIME_TYPE
    );
    Ok(())
}

pub fn sample(args: &SampleArgs) -> Result<()> {
    sample::write_sample(args.spec(), &args.output)
        .with_context(|| format!("failed to write sample workbook to {:?}", args.output))?;
    Ok(())
}
