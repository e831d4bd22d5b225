use super::{Report, ReportFormat, ReportType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use uuid::Uuid;

/// Listing entry for the report history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub id: Uuid,
    pub number: String,
    pub title: &'static str,
    pub report_type: ReportType,
    pub company_name: String,
    pub client_name: Option<String>,
    pub report_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub formats: Vec<ReportFormat>,
}

/// Bounded report history, oldest first.
#[derive(Debug)]
pub struct ReportStore {
    capacity: usize,
    reports: VecDeque<Report>,
}

impl ReportStore {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ReportStore {
            capacity,
            reports: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Stores `report`, returning the evicted oldest entry when full.
    pub fn insert(&mut self, report: Report) -> Option<Report> {
        let evicted = if self.reports.len() >= self.capacity {
            self.reports.pop_front()
        } else {
            None
        };
        self.reports.push_back(report);
        evicted
    }

    pub fn get(&self, id: &Uuid) -> Option<&Report> {
        self.reports.iter().find(|report| &report.id == id)
    }

    /// Newest first.
    pub fn list(&self) -> Vec<ReportSummary> {
        self.reports.iter().rev().map(Report::summary).collect()
    }
}
