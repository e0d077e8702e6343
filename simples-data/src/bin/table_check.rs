use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use simples_core::{Annex, AnnexTable};
use simples_data::AnnexTableLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Validate a Simples Nacional annex table CSV without starting the server.
///
/// The CSV file should have the following columns:
/// - annex: annex code (annex_i ... annex_v)
/// - bracket: bracket label (e.g. 1ª Faixa)
/// - revenue_min / revenue_max: RBT12 range of the bracket
/// - rate_percent: nominal rate in percent
/// - deduction_amount: deduction applied before dividing by RBT12
/// - irpj, csll, cofins, pis_pasep, cpp, ipi, icms, iss: partition shares
#[derive(Parser, Debug)]
#[command(name = "simples-table-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file; the bundled table is checked when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

fn print_summary(table: &AnnexTable) {
    for annex in table.all_annexes() {
        let brackets = table.brackets_for(annex);
        println!(
            "{} ({:?}): {} brackets, ceiling {}",
            annex,
            annex.local_tax(),
            brackets.len(),
            table.ceiling(annex)
        );
        for bracket in brackets {
            println!(
                "  {:<10} {:>12} .. {:<12} rate {:>6}% deduction {:>10}",
                bracket.label,
                bracket.revenue_min,
                bracket.revenue_max,
                bracket.nominal_rate,
                bracket.deduction_amount
            );
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let table = match &args.file {
        Some(path) => AnnexTableLoader::load_path(path)
            .with_context(|| format!("Invalid annex table: {}", path.display()))?,
        None => AnnexTableLoader::bundled().context("Bundled annex table is invalid")?,
    };

    print_summary(&table);

    let brackets: usize = Annex::ALL
        .iter()
        .map(|annex| table.brackets_for(*annex).len())
        .sum();
    info!(brackets, "annex table is consistent");

    Ok(())
}
