//! Client Reports
//!
//! A report bundles the request that produced it (who it is for, which
//! formats to offer) with a [`ReportData`] snapshot computed from an
//! equal-weight portfolio over [`REPORT_UNIVERSE`]. Rendering into HTML, XLSX
//! and text lives in [`crate::export`].

mod store;

pub use store::{ReportStore, ReportSummary};

use crate::analytics::percentile;
use crate::portfolio::{PortfolioAnalysis, PortfolioError, Weights};
use crate::ticker::{Ticker, TickerError};
use crate::time_series::MarketDataProvider;
use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;
use uuid::Uuid;

/// Stocks every report ranks, in display order.
pub const REPORT_UNIVERSE: [&str; 10] = [
    "AAPL", "MSFT", "NVDA", "TSLA", "GOOGL", "INTC", "PYPL", "META", "NFLX", "AMZN",
];

/// Rating by performance rank, best first.
pub const RATING_LADDER: [&str; 10] = [
    "Buy",
    "Buy",
    "Overweight",
    "Hold",
    "Hold",
    "Underweight",
    "Underweight",
    "Watch",
    "Sell",
    "Sell",
];

/// Business days of history behind the report metrics.
pub const REPORT_WINDOW: usize = 252;

pub const DEFAULT_COMPANY: &str = "FinRisk Pro Analytics";
pub const DEFAULT_ANALYST: &str = "AI Assistant";

const PORTFOLIO_VALUE_MIN: f64 = 100_000.0;
const PORTFOLIO_VALUE_MAX: f64 = 500_000.0;
const MAX_TEXT_FIELD: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[default]
    Stock,
    Portfolio,
    Risk,
    Comprehensive,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Stock,
        ReportType::Portfolio,
        ReportType::Risk,
        ReportType::Comprehensive,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ReportType::Stock => "Stock Analysis Report",
            ReportType::Portfolio => "Portfolio Report",
            ReportType::Risk => "Risk Assessment Report",
            ReportType::Comprehensive => "Comprehensive Analysis Report",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Download formats a report can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    Xlsx,
    Txt,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Html, ReportFormat::Xlsx, ReportFormat::Txt];

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "html" => Some(ReportFormat::Html),
            "xlsx" | "excel" => Some(ReportFormat::Xlsx),
            "txt" | "text" => Some(ReportFormat::Txt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Txt => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Html => "text/html; charset=utf-8",
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Txt => "text/plain; charset=utf-8",
        }
    }
}

/// Which downloads a report offers. The text summary is on unless disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportFormats {
    pub html: bool,
    pub excel: bool,
    pub text: bool,
}

impl Default for ExportFormats {
    fn default() -> Self {
        ExportFormats {
            html: true,
            excel: true,
            text: true,
        }
    }
}

impl ExportFormats {
    pub fn allows(&self, format: ReportFormat) -> bool {
        match format {
            ReportFormat::Html => self.html,
            ReportFormat::Xlsx => self.excel,
            ReportFormat::Txt => self.text,
        }
    }

    pub fn enabled(&self) -> Vec<ReportFormat> {
        ReportFormat::ALL
            .into_iter()
            .filter(|format| self.allows(*format))
            .collect()
    }
}

/// Parameters of a report, as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub report_type: ReportType,
    #[serde(default = "default_company")]
    pub company_name: String,
    #[serde(default = "default_analyst")]
    pub analyst: String,
    /// Defaults to the generation date
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub formats: ExportFormats,
    /// Fixes both the market data and the portfolio value draw
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_company() -> String {
    DEFAULT_COMPANY.to_string()
}

fn default_analyst() -> String {
    DEFAULT_ANALYST.to_string()
}

impl Default for ReportRequest {
    fn default() -> Self {
        ReportRequest {
            report_type: ReportType::default(),
            company_name: default_company(),
            analyst: default_analyst(),
            report_date: None,
            client_name: None,
            client_email: None,
            formats: ExportFormats::default(),
            seed: None,
        }
    }
}

impl ReportRequest {
    /// Trims free-text fields and drops blank optional ones.
    pub fn normalized(mut self) -> Result<Self, ReportError> {
        self.company_name = required_field("company_name", &self.company_name)?;
        self.analyst = required_field("analyst", &self.analyst)?;
        self.client_name = optional_field("client_name", self.client_name.as_deref())?;
        self.client_email = optional_field("client_email", self.client_email.as_deref())?;

        if let Some(email) = &self.client_email {
            let valid = email
                .split_once('@')
                .map(|(user, domain)| !user.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !valid {
                return Err(ReportError::InvalidRequest(format!(
                    "client_email '{}' is not an email address",
                    email
                )));
            }
        }

        if self.formats.enabled().is_empty() {
            return Err(ReportError::InvalidRequest(
                "at least one export format must be enabled".to_string(),
            ));
        }

        Ok(self)
    }
}

fn required_field(name: &str, value: &str) -> Result<String, ReportError> {
    optional_field(name, Some(value))?
        .ok_or_else(|| ReportError::InvalidRequest(format!("{} must not be empty", name)))
}

fn optional_field(name: &str, value: Option<&str>) -> Result<Option<String>, ReportError> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) => value,
    };
    if value.chars().count() > MAX_TEXT_FIELD {
        return Err(ReportError::InvalidRequest(format!(
            "{} exceeds {} characters",
            name, MAX_TEXT_FIELD
        )));
    }
    Ok(Some(value.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    InvalidRequest(String),
    Ticker(TickerError),
    Portfolio(PortfolioError),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::InvalidRequest(msg) => write!(f, "Invalid report request: {}", msg),
            ReportError::Ticker(e) => write!(f, "Report universe error: {}", e),
            ReportError::Portfolio(e) => write!(f, "Report analysis failed: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<TickerError> for ReportError {
    fn from(e: TickerError) -> Self {
        ReportError::Ticker(e)
    }
}

impl From<PortfolioError> for ReportError {
    fn from(e: PortfolioError) -> Self {
        ReportError::Portfolio(e)
    }
}

/// One ranked stock in the performance section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockPerformance {
    pub ticker: Ticker,
    pub period_return: f64,
    pub rating: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Overweight,
    Hold,
    Underweight,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Overweight => "Overweight",
            Action::Hold => "Hold",
            Action::Underweight => "Underweight",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    pub sector: &'static str,
    pub rationale: &'static str,
}

pub const RECOMMENDATIONS: [Recommendation; 3] = [
    Recommendation {
        action: Action::Overweight,
        sector: "Technology",
        rationale: "Sector recovery with strong growth potential",
    },
    Recommendation {
        action: Action::Hold,
        sector: "Consumer",
        rationale: "Defensive profile with stable returns",
    },
    Recommendation {
        action: Action::Underweight,
        sector: "Energy",
        rationale: "Cyclical high with rising downside risk",
    },
];

pub const RISK_NOTICES: [&str; 4] = [
    "Market volatility may increase; keep position sizes under control",
    "Monitor central bank policy changes and their effect on markets",
    "Geopolitical events may shock global markets",
    "Review portfolio risk exposure regularly",
];

/// Follow-up steps: horizon and action.
pub const ACTION_PLAN: [(&str, &str); 4] = [
    ("Immediately", "Rebalance the portfolio toward defensive assets"),
    ("Within a week", "Review holdings and set stop losses at -8%"),
    ("Within a month", "Reassess the market environment and adjust strategy"),
    ("Each quarter", "Review portfolio performance and optimise allocation"),
];

/// Figures shown in every report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub portfolio_value: f64,
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// 95% historical VaR of the daily portfolio return
    pub var_95: f64,
    /// Whole universe, best period return first
    pub stocks: Vec<StockPerformance>,
    pub recommendations: Vec<Recommendation>,
}

impl ReportData {
    /// Analyses an equal-weight portfolio of [`REPORT_UNIVERSE`] and ranks
    /// its members. `rng` only draws the notional portfolio value.
    pub fn build<P, R>(provider: &P, rng: &mut R) -> Result<Self, ReportError>
    where
        P: MarketDataProvider + Sync + ?Sized,
        R: Rng + ?Sized,
    {
        let tickers = REPORT_UNIVERSE
            .iter()
            .map(Ticker::new)
            .collect::<Result<Vec<_>, _>>()?;
        let weights = Weights::equal(tickers)?;
        let analysis = PortfolioAnalysis::run(provider, &weights, REPORT_WINDOW)?;

        let daily: Vec<f64> = analysis.daily_returns.iter().map(|p| p.value).collect();
        let var_95 = percentile(&daily, 5.0);

        Ok(ReportData {
            portfolio_value: rng.gen_range(PORTFOLIO_VALUE_MIN..PORTFOLIO_VALUE_MAX),
            annual_return: analysis.metrics.annual_return,
            annual_volatility: analysis.metrics.annual_volatility,
            sharpe_ratio: analysis.metrics.sharpe_ratio,
            max_drawdown: analysis.metrics.max_drawdown,
            var_95,
            stocks: rank_stocks(&analysis),
            recommendations: RECOMMENDATIONS.to_vec(),
        })
    }

    /// Three best stocks by period return.
    pub fn top_performers(&self) -> &[StockPerformance] {
        &self.stocks[..self.stocks.len().min(3)]
    }

    /// Three worst stocks, worst first.
    pub fn worst_performers(&self) -> Vec<&StockPerformance> {
        self.stocks.iter().rev().take(3).collect()
    }

    /// Summary rows: label and formatted value.
    pub fn metric_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Portfolio Value", format_amount(self.portfolio_value)),
            ("Annual Return", format!("{:.2}%", self.annual_return * 100.0)),
            ("Annual Volatility", format!("{:.2}%", self.annual_volatility * 100.0)),
            ("Sharpe Ratio", format!("{:.2}", self.sharpe_ratio)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown * 100.0)),
            ("VaR (95%)", format!("{:.2}%", self.var_95 * 100.0)),
        ]
    }
}

fn rank_stocks(analysis: &PortfolioAnalysis) -> Vec<StockPerformance> {
    let mut rows: Vec<_> = analysis
        .allocation
        .iter()
        .map(|row| (row.ticker.clone(), row.period_return))
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));

    let count = rows.len();
    rows.into_iter()
        .enumerate()
        .map(|(rank, (ticker, period_return))| StockPerformance {
            ticker,
            period_return,
            rating: rating_for(rank, count),
        })
        .collect()
}

/// Maps a rank onto the ladder, stretching it for universes of other sizes.
fn rating_for(rank: usize, count: usize) -> &'static str {
    let slot = (rank * RATING_LADDER.len()) / count.max(1);
    RATING_LADDER[slot.min(RATING_LADDER.len() - 1)]
}

/// Whole currency units with thousands separators, e.g. `"123,457"`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// A generated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: Uuid,
    /// Human-facing number, `FR-YYYYMMDDHHMMSS`
    pub number: String,
    pub created_at: DateTime<Utc>,
    pub report_date: NaiveDate,
    pub request: ReportRequest,
    pub data: ReportData,
}

impl Report {
    /// Validates `request` and computes its data.
    ///
    /// With a seed, the portfolio value draw is reproducible; pair it with a
    /// seeded provider for fully repeatable reports.
    pub fn generate<P>(
        provider: &P,
        request: ReportRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, ReportError>
    where
        P: MarketDataProvider + Sync + ?Sized,
    {
        let request = request.normalized()?;
        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let data = ReportData::build(provider, &mut rng)?;

        let report = Report {
            id: Uuid::new_v4(),
            number: report_number(now),
            created_at: now,
            report_date: request.report_date.unwrap_or_else(|| now.date_naive()),
            request,
            data,
        };

        info!(
            id = %report.id,
            number = %report.number,
            report_type = report.request.report_type.title(),
            "report generated"
        );

        Ok(report)
    }

    pub fn title(&self) -> &'static str {
        self.request.report_type.title()
    }

    /// Download name for `format`, e.g. `Portfolio_Report_data_2024-06-28.xlsx`.
    pub fn file_name(&self, format: ReportFormat) -> String {
        let stem = self.title().replace(' ', "_");
        let date = self.report_date.format("%Y-%m-%d");
        match format {
            ReportFormat::Html => format!("{}_{}.html", stem, date),
            ReportFormat::Xlsx => format!("{}_data_{}.xlsx", stem, date),
            ReportFormat::Txt => format!("{}_summary_{}.txt", stem, date),
        }
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id,
            number: self.number.clone(),
            title: self.title(),
            report_type: self.request.report_type,
            company_name: self.request.company_name.clone(),
            client_name: self.request.client_name.clone(),
            report_date: self.report_date,
            created_at: self.created_at,
            formats: self.request.formats.enabled(),
        }
    }
}

pub fn report_number(now: DateTime<Utc>) -> String {
    format!("FR-{}", now.format("%Y%m%d%H%M%S"))
}

/// A layout preset offered by the report page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub features: [&'static str; 3],
}

pub const TEMPLATES: [ReportTemplate; 4] = [
    ReportTemplate {
        id: "simple",
        name: "Simple Report",
        description: "Quick analysis with core metrics and brief recommendations",
        features: ["Core metrics", "Brief recommendations", "One-page summary"],
    },
    ReportTemplate {
        id: "detailed",
        name: "Detailed Report",
        description: "Full analysis with charts, data tables and detailed recommendations",
        features: ["Full analysis", "Data tables", "Detailed recommendations"],
    },
    ReportTemplate {
        id: "professional",
        name: "Professional Report",
        description: "Industry-standard format with stress tests and scenario analysis",
        features: ["Stress testing", "Scenario analysis", "Professional format"],
    },
    ReportTemplate {
        id: "client",
        name: "Client Report",
        description: "Client-facing, easy to read with visual charts",
        features: ["Client friendly", "Visualisations", "Plain language"],
    },
];
