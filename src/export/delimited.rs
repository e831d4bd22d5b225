use super::ExportError;
use crate::time_series::PriceSeries;
use serde::Serialize;

/// Serializes `rows` with a header derived from their field names.
pub fn rows_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer)
}

/// `date,open,high,low,close,volume`, oldest bar first.
pub fn price_series_csv(series: &PriceSeries) -> Result<Vec<u8>, ExportError> {
    if series.is_empty() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["date", "open", "high", "low", "close", "volume"])?;
        return finish(writer);
    }
    rows_csv(&series.bars)
}

/// Two-column `metric,value` table.
pub fn metrics_csv<L, V>(rows: &[(L, V)]) -> Result<Vec<u8>, ExportError>
where
    L: AsRef<str>,
    V: AsRef<str>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["metric", "value"])?;
    for (label, value) in rows {
        writer.write_record([label.as_ref(), value.as_ref()])?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.error().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticker::Ticker;
    use crate::time_series::PriceBar;
    use chrono::NaiveDate;

    #[test]
    fn price_csv_has_expected_header_and_rows() {
        let bars = vec![PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            open: 100.0,
            high: 102.5,
            low: 99.5,
            close: 101.25,
            volume: 1_500_000,
        }];
        let series = PriceSeries::new(Ticker::new("AAPL").unwrap(), bars);
        let text = String::from_utf8(price_series_csv(&series).unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "date,open,high,low,close,volume");
        assert_eq!(lines[1], "2024-06-28,100.0,102.5,99.5,101.25,1500000");
    }

    #[test]
    fn empty_series_still_has_header() {
        let series = PriceSeries::new(Ticker::new("AAPL").unwrap(), Vec::new());
        let text = String::from_utf8(price_series_csv(&series).unwrap()).unwrap();
        assert_eq!(text.trim_end(), "date,open,high,low,close,volume");
    }

    #[test]
    fn metrics_csv_quotes_when_needed() {
        let rows = vec![("VaR (95%)", "-2.10%"), ("Portfolio Value", "1,234")];
        let text = String::from_utf8(metrics_csv(&rows).unwrap()).unwrap();
        assert_eq!(text, "metric,value\nVaR (95%),-2.10%\nPortfolio Value,\"1,234\"\n");
    }
}
