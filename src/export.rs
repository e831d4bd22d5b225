//! Downloadable renderings of series, metrics and reports.

mod delimited;
mod html;
mod text;
mod workbook;

pub use delimited::{metrics_csv, price_series_csv, rows_csv};
pub use html::{escape_html, report_html};
pub use text::report_text;
pub use workbook::{report_workbook, METRICS_SHEET, RECOMMENDATIONS_SHEET, STOCKS_SHEET};

use crate::report::{Report, ReportFormat};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ExportError {
    Csv(String),
    Workbook(String),
    /// The report was generated without this format enabled
    FormatDisabled(ReportFormat),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Csv(msg) => write!(f, "CSV export failed: {}", msg),
            ExportError::Workbook(msg) => write!(f, "Excel export failed: {}", msg),
            ExportError::FormatDisabled(format) => write!(
                f,
                "Format '{}' was not enabled for this report",
                format.extension()
            ),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Csv(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Workbook(e.to_string())
    }
}

/// A rendered download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders `report` in `format`, refusing formats the request left disabled.
pub fn render_report(report: &Report, format: ReportFormat) -> Result<ExportFile, ExportError> {
    if !report.request.formats.allows(format) {
        return Err(ExportError::FormatDisabled(format));
    }
    let bytes = match format {
        ReportFormat::Html => report_html(report).into_bytes(),
        ReportFormat::Xlsx => report_workbook(report)?,
        ReportFormat::Txt => report_text(report).into_bytes(),
    };
    Ok(ExportFile {
        file_name: report.file_name(format),
        content_type: format.content_type(),
        bytes,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ExportFormats, ReportRequest};

    #[test]
    fn renders_enabled_formats_only() {
        let request = ReportRequest {
            formats: ExportFormats {
                html: true,
                excel: false,
                text: true,
            },
            ..ReportRequest::default()
        };
        let report = fixtures::report(request);

        let html = render_report(&report, ReportFormat::Html).unwrap();
        assert_eq!(html.file_name, "Stock_Analysis_Report_2024-06-28.html");
        assert!(html.content_type.starts_with("text/html"));

        assert_eq!(
            render_report(&report, ReportFormat::Xlsx).unwrap_err(),
            ExportError::FormatDisabled(ReportFormat::Xlsx)
        );
    }

    #[test]
    fn workbook_download_is_a_zip() {
        let report = fixtures::report(ReportRequest::default());
        let file = render_report(&report, ReportFormat::Xlsx).unwrap();
        assert_eq!(&file.bytes[..2], b"PK");
        assert_eq!(file.file_name, "Stock_Analysis_Report_data_2024-06-28.xlsx");
    }
}
