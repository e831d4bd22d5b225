use super::ExportError;
use crate::report::Report;
use rust_xlsxwriter::{Format, Workbook};

pub const METRICS_SHEET: &str = "Portfolio Metrics";
pub const RECOMMENDATIONS_SHEET: &str = "Recommendations";
pub const STOCKS_SHEET: &str = "Stock Performance";

/// XLSX workbook with the metric, recommendation and stock sheets.
pub fn report_workbook(report: &Report) -> Result<Vec<u8>, ExportError> {
    let data = &report.data;
    let header = Format::new().set_bold();
    let percent = Format::new().set_num_format("0.00%");

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(METRICS_SHEET)?;
    sheet.write_string_with_format(0, 0, "Metric", &header)?;
    sheet.write_string_with_format(0, 1, "Value", &header)?;
    sheet.write_string_with_format(0, 2, "Rating", &header)?;
    for (row, (label, value)) in (1u32..).zip(data.metric_rows().iter()) {
        sheet.write_string(row, 0, *label)?;
        sheet.write_string(row, 1, value.as_str())?;
    }
    sheet.set_column_width(0, 22)?;
    sheet.set_column_width(1, 16)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(RECOMMENDATIONS_SHEET)?;
    for (col, title) in (0u16..).zip(["Action", "Sector", "Rationale"]) {
        sheet.write_string_with_format(0, col, title, &header)?;
    }
    for (row, rec) in (1u32..).zip(data.recommendations.iter()) {
        sheet.write_string(row, 0, rec.action.as_str())?;
        sheet.write_string(row, 1, rec.sector)?;
        sheet.write_string(row, 2, rec.rationale)?;
    }
    sheet.set_column_width(2, 48)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(STOCKS_SHEET)?;
    for (col, title) in (0u16..).zip(["Ticker", "Period Return", "Rating"]) {
        sheet.write_string_with_format(0, col, title, &header)?;
    }
    for (row, stock) in (1u32..).zip(data.stocks.iter()) {
        sheet.write_string(row, 0, stock.ticker.as_str())?;
        sheet.write_number_with_format(row, 1, stock.period_return, &percent)?;
        sheet.write_string(row, 2, stock.rating)?;
    }

    Ok(workbook.save_to_buffer()?)
}
