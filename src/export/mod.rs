pub mod csv_table;
pub mod workbook;

pub use csv_table::{write_dashboard_csvs, write_series, write_table};
pub use workbook::generate_dashboard_report;

use rust_xlsxwriter::{
    ConditionalFormatCell, ConditionalFormatCellRule, Format, FormatBorder, Worksheet, XlsxError,
};

/// Blue #2C5F8A header, white bold text, thin border.
pub fn create_header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("2C5F8A")
        .set_font_color("FFFFFF")
        .set_font_size(11)
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
}

pub fn create_date_format() -> Format {
    Format::new().set_num_format("yyyy-mm-dd")
}

/// Hours, amounts and rates: #,##0.00
pub fn create_number_format() -> Format {
    Format::new().set_num_format("#,##0.00")
}

pub fn create_integer_format() -> Format {
    Format::new().set_num_format("#,##0")
}

/// Utilization cells as 0.0 with a % suffix; values are already percentages.
pub fn create_percent_format() -> Format {
    Format::new().set_num_format("0.0\"%\"")
}

/// Colour band of a percentage cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBand {
    Green,
    Yellow,
    Red,
}

impl RateBand {
    fn format(&self) -> Format {
        match self {
            RateBand::Green => Format::new()
                .set_background_color("C6EFCE")
                .set_font_color("006100"),
            RateBand::Yellow => Format::new()
                .set_background_color("FFEB9C")
                .set_font_color("9C6500"),
            RateBand::Red => Format::new()
                .set_background_color("FFC7CE")
                .set_font_color("9C0006"),
        }
    }
}

/// Band rules in priority order. `Between` is inclusive, so green is listed
/// first and a value of exactly `high` stops there.
pub fn rate_band_rules(thresholds: (f64, f64)) -> [(RateBand, ConditionalFormatCellRule<f64>); 3] {
    let (low, high) = thresholds;
    [
        (RateBand::Green, ConditionalFormatCellRule::GreaterThanOrEqualTo(high)),
        (RateBand::Yellow, ConditionalFormatCellRule::Between(low, high)),
        (RateBand::Red, ConditionalFormatCellRule::LessThan(low)),
    ]
}

/// Three-level highlight on a percentage column.
/// `thresholds` = (low, high): red < low | yellow low..high | green >= high
pub fn apply_rate_conditional_format(
    ws: &mut Worksheet,
    first_row: u32,
    col: u16,
    last_row: u32,
    thresholds: (f64, f64),
) -> Result<(), XlsxError> {
    for (band, rule) in rate_band_rules(thresholds) {
        let format = band.format();
        ws.add_conditional_format(
            first_row,
            col,
            last_row,
            col,
            &ConditionalFormatCell::new()
                .set_rule(rule)
                .set_format(&format)
                .set_stop_if_true(true),
        )?;
    }
    Ok(())
}
