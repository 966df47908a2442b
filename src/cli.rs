use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::chart::ChartSize;
use crate::config::DashboardConfig;
use crate::constants::{HOLDINGS_SHEET, OWNERSHIP_SHEET, SOURCE_PATH};
use crate::report::ChartKind;
use crate::sample::SampleSpec;

#[derive(Debug, Parser)]
#[command(author, version, about = "Institutional ownership dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}

#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Workbook holding the ownership and institution holdings sheets
    #[arg(long, global = true, default_value = SOURCE_PATH)]
    pub source: PathBuf,

    /// Sheet with one row per company per quarter
    #[arg(long, global = true, default_value = OWNERSHIP_SHEET)]
    pub ownership_sheet: String,

    /// Sheet with one row per company per reporting institution
    #[arg(long, global = true, default_value = HOLDINGS_SHEET)]
    pub holdings_sheet: String,
}

impl SourceArgs {
    pub fn config(&self) -> DashboardConfig {
        DashboardConfig {
            source_path: self.source.clone(),
            ownership_sheet: self.ownership_sheet.clone(),
            holdings_sheet: self.holdings_sheet.clone(),
            ..DashboardConfig::default()
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print metrics, trend charts and rankings for one company
    Report(ReportArgs),
    /// List known companies and their quarters
    Companies,
    /// Write the processed ownership table to a spreadsheet
    Export(ExportArgs),
    /// Generate a synthetic source workbook
    Sample(SampleArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Report(ReportArgs::default())
    }
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Company symbol (defaults to the first company in the workbook)
    #[arg(short, long)]
    pub company: Option<String>,

    /// Quarter label to include, e.g. "Mar 2024"; repeat for several (defaults to all)
    #[arg(short, long = "quarter")]
    pub quarters: Vec<String>,

    /// How to draw the institution holdings
    #[arg(long, default_value_t = ChartKind::Bar)]
    pub chart: ChartKind,

    /// Rows shown in each ranking [default: 10]
    #[arg(long)]
    pub top: Option<usize>,

    /// Chart width in characters
    #[arg(long, default_value_t = 120)]
    pub width: u32,

    /// Chart height in characters
    #[arg(long, default_value_t = 30)]
    pub height: u32,

    /// Emit the report as JSON instead of tables and charts
    #[arg(long)]
    pub json: bool,
}

impl Default for ReportArgs {
    fn default() -> Self {
        let size = ChartSize::default();
        Self {
            company: None,
            quarters: Vec::new(),
            chart: ChartKind::Bar,
            top: None,
            width: size.width,
            height: size.height,
            json: false,
        }
    }
}

impl ReportArgs {
    pub fn chart_size(&self) -> ChartSize {
        ChartSize {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Destination of the processed workbook [default: processed_ownership_data.xlsx]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Destination of the generated workbook
    #[arg(short, long, default_value = SOURCE_PATH)]
    pub output: PathBuf,

    #[arg(long, default_value_t = SampleSpec::default().companies)]
    pub companies: usize,

    #[arg(long, default_value_t = SampleSpec::default().quarters)]
    pub quarters: usize,

    #[arg(long, default_value_t = SampleSpec::default().seed)]
    pub seed: u64,
}

impl SampleArgs {
    pub fn spec(&self) -> SampleSpec {
        SampleSpec {
            companies: self.companies,
            quarters: self.quarters,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_report() {
        let cli = Cli::parse_from(["ownership-dashboard"]);
        assert!(matches!(cli.command(), Command::Report(_)));
        assert_eq!(cli.source.config().source_path, PathBuf::from(SOURCE_PATH));
    }

    #[test]
    fn parses_report_selection() {
        let cli = Cli::parse_from([
            "ownership-dashboard",
            "--source",
            "data.xlsx",
            "report",
            "--company",
            "ACME",
            "-q",
            "Mar 2024",
            "-q",
            "Jun 2024",
            "--chart",
            "pie",
        ]);
        let Command::Report(args) = cli.command() else {
            panic!("expected report command");
        };
        assert_eq!(args.company.as_deref(), Some("ACME"));
        assert_eq!(args.quarters, vec!["Mar 2024", "Jun 2024"]);
        assert_eq!(args.chart, ChartKind::Pie);
        assert_eq!(cli.source.source, PathBuf::from("data.xlsx"));
    }
}
