use crate::report::{format_amount, Report};

const NOT_SPECIFIED: &str = "Not specified";

/// Plain-text summary of a report.
pub fn report_text(report: &Report) -> String {
    let request = &report.request;
    let data = &report.data;

    let mut out = String::new();
    out.push_str(report.title());
    out.push('\n');
    out.push_str(&format!(
        "Generated: {}\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Report No.: {}\n", report.number));
    out.push_str(&format!("Report Date: {}\n", report.report_date));
    out.push_str(&format!("Company: {}\n", request.company_name));
    out.push_str(&format!("Analyst: {}\n", request.analyst));
    out.push_str(&format!(
        "Client: {}\n",
        request.client_name.as_deref().unwrap_or(NOT_SPECIFIED)
    ));

    out.push_str("\nExecutive Summary:\n");
    out.push_str(&format!("- Portfolio Value: {}\n", format_amount(data.portfolio_value)));
    out.push_str(&format!("- Annual Return: {:.2}%\n", data.annual_return * 100.0));
    out.push_str(&format!("- Sharpe Ratio: {:.2}\n", data.sharpe_ratio));
    out.push_str(&format!("- Max Drawdown: {:.2}%\n", data.max_drawdown * 100.0));
    out.push_str(&format!("- VaR (95%): {:.2}%\n", data.var_95 * 100.0));

    out.push_str("\nRecommendations:\n");
    for rec in &data.recommendations {
        out.push_str(&format!(
            "- {}: {} - {}\n",
            rec.action.as_str(),
            rec.sector,
            rec.rationale
        ));
    }

    out.push_str("\nRisk Notice: Markets carry risk; invest with caution.\n");
    out
}
