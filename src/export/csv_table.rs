use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analyzer::aggregate::AggregationResult;
use crate::analyzer::dashboard::DashboardView;
use crate::analyzer::metrics::{round2, Metric};
use crate::analyzer::temporal::TimeSeries;
use crate::error::AppError;

fn fmt2(v: f64) -> String {
    format!("{:.2}", round2(v))
}

/// Write a grouped table: key columns, then the table's measures, then the
/// derived metrics. Numbers are rounded to two decimals here and nowhere
/// earlier.
pub fn write_table<W: Write>(
    table: &AggregationResult,
    writer: W,
    delimiter: u8,
) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let mut header: Vec<&str> = table
        .group_by
        .dimensions()
        .iter()
        .map(|d| d.column_name())
        .collect();
    header.extend(table.measures.iter().map(|m| m.label()));
    header.extend(Metric::ALL.iter().map(|m| m.label()));
    wtr.write_record(&header)?;

    for (key, totals) in table.rows() {
        let metrics = totals.metrics();
        let mut row: Vec<String> = key.to_vec();
        row.extend(table.measures.iter().map(|m| fmt2(totals.get(*m))));
        row.extend(Metric::ALL.iter().map(|m| fmt2(metrics.get(*m))));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_series<W: Write>(series: &TimeSeries, writer: W, delimiter: u8) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    wtr.write_record(["Period", "Billable Hours", "Billed Hours", "Non-Billable Hours"])?;
    for p in &series.points {
        wtr.write_record([
            p.period_key.clone(),
            fmt2(p.billable_hours),
            fmt2(p.billed_hours),
            fmt2(p.non_billable_hours),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write every dashboard table as `<name>.csv` under `dir`, creating it if
/// needed. Returns the written paths in write order.
pub fn write_dashboard_csvs(
    view: &DashboardView,
    dir: &Path,
    delimiter: u8,
) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for (name, table) in view.named_tables() {
        let path = dir.join(format!("{}.csv", name));
        write_table(table, File::create(&path)?, delimiter)?;
        log::debug!("Wrote {} ({} rows)", path.display(), table.len());
        written.push(path);
    }

    for (name, series) in [("daily_trend", &view.daily), ("monthly_trend", &view.monthly)] {
        let path = dir.join(format!("{}.csv", name));
        write_series(series, File::create(&path)?, delimiter)?;
        log::debug!("Wrote {} ({} periods)", path.display(), series.points.len());
        written.push(path);
    }

    log::info!("Exported {} tables to {}", written.len(), dir.display());
    Ok(written)
}
