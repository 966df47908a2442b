use anyhow::Result;
use clap::Parser;
use ownership_dashboard::cli::{Cli, Command};
use ownership_dashboard::dashboard;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.source.config();
    match cli.command() {
        Command::Report(args) => dashboard::report(&config, &args),
        Command::Companies => dashboard::companies(&config),
        Command::Export(args) => dashboard::export(&config, &args),
        Command::Sample(args) => dashboard::sample(&args),
    }
}
