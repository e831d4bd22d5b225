use crate::report::{format_amount, Action, Report, ACTION_PLAN, RISK_NOTICES};

const STYLE: &str = r#"
body { font-family: Arial, Helvetica, sans-serif; line-height: 1.6; color: #333; max-width: 1000px; margin: 0 auto; padding: 20px; background-color: #f9f9f9; }
.header { text-align: center; border-bottom: 3px solid #1E3A8A; margin-bottom: 30px; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
.section { background: white; padding: 25px; margin: 20px 0; border-radius: 10px; box-shadow: 0 2px 5px rgba(0,0,0,0.05); border-left: 4px solid #3B82F6; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; margin: 20px 0; }
.metric-card { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 20px; border-radius: 10px; text-align: center; }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 30px; }
.table { width: 100%; border-collapse: collapse; margin: 20px 0; }
.table th, .table td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
.table th { background-color: #1E3A8A; color: white; }
.recommendation-buy { color: #10B981; font-weight: bold; }
.recommendation-hold { color: #F59E0B; font-weight: bold; }
.recommendation-sell { color: #EF4444; font-weight: bold; }
.footer { text-align: center; margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; color: #666; font-size: 0.9em; }
@media print { body { padding: 0; } }
"#;

/// Escapes text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn action_class(action: Action) -> &'static str {
    match action {
        Action::Overweight => "recommendation-buy",
        Action::Hold => "recommendation-hold",
        Action::Underweight => "recommendation-sell",
    }
}

/// Standalone HTML document for `report`.
pub fn report_html(report: &Report) -> String {
    let request = &report.request;
    let data = &report.data;
    let title = report.title();
    let company = escape_html(&request.company_name);
    let analyst = escape_html(&request.analyst);
    let client = request
        .client_name
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "N/A".to_string());
    let date = report.report_date.format("%B %-d, %Y").to_string();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("<title>{} - {}</title>\n", title, company));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));

    html.push_str("<div class=\"header\">\n");
    html.push_str(&format!("<h1>{}</h1>\n<h3>{}</h3>\n", title, company));
    html.push_str(&format!(
        "<p>Report date: {} | Analyst: {} | Client: {}</p>\n",
        date, analyst, client
    ));
    if let Some(email) = &request.client_email {
        html.push_str(&format!("<p>Contact: {}</p>\n", escape_html(email)));
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"section\">\n<h2>Executive Summary</h2>\n");
    html.push_str(
        "<p>This report draws on the FinRisk risk models and market data to assess \
         portfolio performance, risk indicators and market trends.</p>\n",
    );
    html.push_str("<div class=\"cards\">\n");
    let cards = [
        ("Portfolio Value", format_amount(data.portfolio_value)),
        ("Annual Return", format!("{:.1}%", data.annual_return * 100.0)),
        ("Sharpe Ratio", format!("{:.2}", data.sharpe_ratio)),
        ("Max Drawdown", format!("{:.1}%", data.max_drawdown * 100.0)),
    ];
    for (label, value) in &cards {
        html.push_str(&format!(
            "<div class=\"metric-card\"><h3>{}</h3><h2>{}</h2></div>\n",
            label, value
        ));
    }
    html.push_str("</div>\n</div>\n");

    html.push_str("<div class=\"section\">\n<h2>Portfolio Performance</h2>\n");
    html.push_str("<table class=\"table\">\n<thead><tr><th>Metric</th><th>Value</th></tr></thead>\n<tbody>\n");
    for (label, value) in data.metric_rows().iter().skip(1) {
        html.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>\n", label, value));
    }
    html.push_str("</tbody>\n</table>\n</div>\n");

    html.push_str("<div class=\"section\">\n<h2>Stock Performance</h2>\n<div class=\"columns\">\n");
    html.push_str("<div>\n<h3>Top Performers</h3>\n<ul>\n");
    for stock in data.top_performers() {
        html.push_str(&format!(
            "<li><strong>{}</strong>: {:+.1}% ({})</li>\n",
            stock.ticker,
            stock.period_return * 100.0,
            stock.rating
        ));
    }
    html.push_str("</ul>\n</div>\n<div>\n<h3>Worst Performers</h3>\n<ul>\n");
    for stock in data.worst_performers() {
        html.push_str(&format!(
            "<li><strong>{}</strong>: {:+.1}% ({})</li>\n",
            stock.ticker,
            stock.period_return * 100.0,
            stock.rating
        ));
    }
    html.push_str("</ul>\n</div>\n</div>\n</div>\n");

    html.push_str("<div class=\"section\">\n<h2>Recommendations</h2>\n");
    html.push_str("<table class=\"table\">\n<thead><tr><th>Action</th><th>Sector</th><th>Rationale</th></tr></thead>\n<tbody>\n");
    for rec in &data.recommendations {
        html.push_str(&format!(
            "<tr><td><span class=\"{}\">{}</span></td><td>{}</td><td>{}</td></tr>\n",
            action_class(rec.action),
            rec.action.as_str(),
            rec.sector,
            rec.rationale
        ));
    }
    html.push_str("</tbody>\n</table>\n<h3>Risk Notices</h3>\n<ul>\n");
    for notice in RISK_NOTICES {
        html.push_str(&format!("<li>{}</li>\n", notice));
    }
    html.push_str("</ul>\n</div>\n");

    html.push_str("<div class=\"section\">\n<h2>Action Plan</h2>\n<ol>\n");
    for (horizon, step) in ACTION_PLAN {
        html.push_str(&format!("<li><strong>{}</strong>: {}</li>\n", horizon, step));
    }
    html.push_str("</ol>\n</div>\n");

    html.push_str("<div class=\"footer\">\n");
    html.push_str(
        "<p><strong>Disclaimer</strong>: This report is for reference only and does not \
         constitute investment advice. Past performance does not guarantee future results.</p>\n",
    );
    html.push_str(&format!(
        "<p>{} | {} | Report No.: {}</p>\n",
        company, date, report.number
    ));
    html.push_str(&format!(
        "<p>Contact: {} | Generated: {}</p>\n",
        analyst,
        report.created_at.format("%Y-%m-%d %H:%M:%S")
    ));
    html.push_str("</div>\n</body>\n</html>\n");
    html
}
