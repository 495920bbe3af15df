use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use billing_dash::analyzer::metrics::round2;
use billing_dash::cli::{Cli, OutputFormat};
use billing_dash::{export, parser, AppConfig, DashboardView, FacetOptions, FilterSpec};

/// Install the log subscriber. RUST_LOG wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_text(view: &DashboardView) {
    let k = &view.key_metrics;
    let d = &view.hours_distribution;

    println!(
        "Entries: {} of {} ({} ms)",
        view.meta.filtered_records, view.meta.total_records, view.meta.calcul_duration_ms
    );
    if view.meta.active_facets.is_empty() {
        println!("Active filters: none");
    } else {
        println!("Active filters:");
        for f in &view.meta.active_facets {
            println!("  {}: {}", f.label, f.value);
        }
    }
    println!();
    println!("Total billable hours   {:>14.2}", k.total_billable_hours);
    println!("Total billable amount  {:>14.2}", k.total_billable_amount);
    println!("Total billed hours     {:>14.2}", k.total_billed_hours);
    println!("Total billed amount    {:>14.2}", k.total_billed_amount);
    println!("Utilization rate       {:>13.2}%", round2(k.utilization_rate));
    println!("Average rate           {:>14.2}", round2(k.average_rate));
    println!();
    println!(
        "Hours: billable {:.2} / non-billable {:.2} / unbilled {:.2}",
        d.billable_hours, d.non_billable_hours, d.unbilled_hours
    );

    if !view.top_clients.is_empty() {
        println!();
        println!("Top {} clients by billable hours:", view.top_clients.len());
        for (i, row) in view.top_clients.iter().enumerate() {
            let name = row.key.first().map(String::as_str).unwrap_or("");
            let name = if name.is_empty() { "(no description)" } else { name };
            println!(
                "  {:>2}. {:<40} {:>10.2} h  {:>12.2}",
                i + 1,
                name,
                row.totals.billable_hours,
                row.totals.billable_amount
            );
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let output = parser::parse_csv(&args.input, &config, |rows| {
        log::trace!("{} rows parsed", rows);
    })
    .with_context(|| format!("Failed to load {}", args.input.display()))?;
    log::info!(
        "Loaded {} entries in {} ms",
        output.records.len(),
        output.parse_duration_ms
    );
    if !output.missing_optional_columns.is_empty() {
        log::warn!(
            "Optional columns absent: {}",
            output.missing_optional_columns.join(", ")
        );
    }

    let spec = match &args.filters {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read filters {}", path.display()))?;
            FilterSpec::from_json(&json)
                .with_context(|| format!("Invalid filters in {}", path.display()))?
        }
        None => FacetOptions::from_records(&output.records).initial_filter(),
    };

    let view = DashboardView::build(&output.records, &spec, config.top_clients);

    match args.format {
        OutputFormat::Text => print_text(&view),
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "load": output.summary(),
                "view": &view,
                "tables": view.tables(),
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }

    if let Some(dir) = &args.export_dir {
        export::write_dashboard_csvs(&view, dir, config.export_delimiter_byte())?;
    }

    if let Some(path) = &args.xlsx {
        let bytes = export::generate_dashboard_report(&view)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }

    Ok(())
}
