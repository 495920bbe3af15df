use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::analyzer::aggregate::AggregationResult;
use crate::analyzer::dashboard::DashboardView;
use crate::analyzer::metrics::Metric;
use crate::analyzer::temporal::TimeSeries;
use crate::error::AppError;
use crate::export::{
    apply_rate_conditional_format, create_date_format, create_header_format,
    create_integer_format, create_number_format, create_percent_format,
};

/// Utilization below 50% is flagged red, 80% and above green.
const UTILIZATION_BANDS: (f64, f64) = (50.0, 80.0);

/// Five-sheet dashboard report. Returns the XLSX bytes via
/// `workbook.save_to_buffer()`.
pub fn generate_dashboard_report(view: &DashboardView) -> Result<Vec<u8>, AppError> {
    let mut wb = Workbook::new();
    write_overview(&mut wb, view)?;
    write_summary_sheet(&mut wb, "Attorneys", &view.by_attorney)?;
    write_summary_sheet(&mut wb, "Practice areas", &view.by_practice_area)?;
    write_summary_sheet(&mut wb, "Clients", &view.by_client)?;
    write_trend(&mut wb, "Monthly", &view.monthly)?;
    let bytes = wb.save_to_buffer()?;
    log::debug!("Dashboard workbook generated ({} bytes)", bytes.len());
    Ok(bytes)
}

// ── Sheet 1: Overview ────────────────────────────────────────────────────────

fn write_overview(wb: &mut Workbook, view: &DashboardView) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("Overview")?;

    let hdr = create_header_format();
    let num = create_number_format();
    let pct = create_percent_format();
    let int = create_integer_format();

    ws.write_with_format(0, 0, "Indicator", &hdr)?;
    ws.write_with_format(0, 1, "Value", &hdr)?;

    let k = &view.key_metrics;
    let d = &view.hours_distribution;
    let kpis: [(&str, f64, &Format); 11] = [
        ("Entries in view", view.meta.filtered_records as f64, &int),
        ("Entries loaded", view.meta.total_records as f64, &int),
        ("Total billable hours", k.total_billable_hours, &num),
        ("Total billable amount", k.total_billable_amount, &num),
        ("Total billed hours", k.total_billed_hours, &num),
        ("Total billed amount", k.total_billed_amount, &num),
        ("Utilization rate", k.utilization_rate, &pct),
        ("Average rate", k.average_rate, &num),
        ("Billable hours", d.billable_hours, &num),
        ("Non-billable hours", d.non_billable_hours, &num),
        ("Unbilled hours", d.unbilled_hours, &num),
    ];
    for (i, (label, value, format)) in kpis.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write(row, 0, *label)?;
        ws.write_with_format(row, 1, *value, *format)?;
    }

    // Active filters
    let header_row = (kpis.len() + 2) as u32;
    ws.write_with_format(header_row, 0, "Active filter", &hdr)?;
    ws.write_with_format(header_row, 1, "Selection", &hdr)?;
    if view.meta.active_facets.is_empty() {
        ws.write(header_row + 1, 0, "None")?;
    }
    for (i, facet) in view.meta.active_facets.iter().enumerate() {
        let row = header_row + 1 + i as u32;
        ws.write(row, 0, facet.label.as_str())?;
        ws.write(row, 1, facet.value.as_str())?;
    }

    ws.set_column_width(0, 28)?;
    ws.set_column_width(1, 40)?;

    Ok(())
}

// ── Grouped tables ───────────────────────────────────────────────────────────

fn metric_format(m: Metric) -> Format {
    match m {
        Metric::AverageRate => create_number_format(),
        Metric::UtilizationRate | Metric::EfficiencyRate => create_percent_format(),
    }
}

fn write_summary_sheet(
    wb: &mut Workbook,
    name: &str,
    table: &AggregationResult,
) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name(name)?;

    let hdr = create_header_format();
    let dimensions = table.group_by.dimensions();
    let key_cols = dimensions.len() as u16;
    let measure_cols = table.measures.len() as u16;

    let mut headers: Vec<&str> = dimensions.iter().map(|d| d.column_name()).collect();
    headers.extend(table.measures.iter().map(|m| m.label()));
    headers.extend(Metric::ALL.iter().map(|m| m.label()));
    for (col, h) in headers.iter().enumerate() {
        ws.write_with_format(0, col as u16, *h, &hdr)?;
    }

    let num = create_number_format();
    let metric_formats: Vec<Format> = Metric::ALL.iter().map(|m| metric_format(*m)).collect();

    for (i, (key, totals)) in table.rows().enumerate() {
        let row = (i + 1) as u32;
        for (col, value) in key.iter().enumerate() {
            ws.write(row, col as u16, value.as_str())?;
        }
        for (j, m) in table.measures.iter().enumerate() {
            let col = key_cols + j as u16;
            ws.write_with_format(row, col, totals.get(*m), &num)?;
        }
        let metrics = totals.metrics();
        for (j, m) in Metric::ALL.iter().enumerate() {
            let col = key_cols + measure_cols + j as u16;
            ws.write_with_format(row, col, metrics.get(*m), &metric_formats[j])?;
        }
    }

    if !table.is_empty() {
        let last_row = table.len() as u32;
        ws.set_freeze_panes(1, 0)?;
        ws.autofilter(0, 0, last_row, (headers.len() - 1) as u16)?;
        apply_rate_conditional_format(ws, 1, key_cols + measure_cols, last_row, UTILIZATION_BANDS)?;
    }

    set_widths(ws, key_cols, headers.len() as u16)
}

fn set_widths(ws: &mut Worksheet, key_cols: u16, total_cols: u16) -> Result<(), XlsxError> {
    for col in 0..key_cols {
        ws.set_column_width(col, 30)?;
    }
    for col in key_cols..total_cols {
        ws.set_column_width(col, 16)?;
    }
    Ok(())
}

// ── Trend ────────────────────────────────────────────────────────────────────

fn write_trend(wb: &mut Workbook, name: &str, series: &TimeSeries) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name(name)?;

    let hdr = create_header_format();
    let num = create_number_format();
    let date = create_date_format();

    let headers = [
        "Period",
        "Period start",
        "Billable hours",
        "Billed hours",
        "Non-billable hours",
    ];
    for (col, h) in headers.iter().enumerate() {
        ws.write_with_format(0, col as u16, *h, &hdr)?;
    }

    for (i, p) in series.points.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write(row, 0, p.period_label.as_str())?;
        ws.write_with_format(row, 1, &p.period_start, &date)?;
        ws.write_with_format(row, 2, p.billable_hours, &num)?;
        ws.write_with_format(row, 3, p.billed_hours, &num)?;
        ws.write_with_format(row, 4, p.non_billable_hours, &num)?;
    }

    if !series.is_empty() {
        ws.set_freeze_panes(1, 0)?;
    }
    ws.set_column_width(0, 18)?;
    for col in 1u16..=4 {
        ws.set_column_width(col, 16)?;
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
