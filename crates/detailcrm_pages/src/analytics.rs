// --- File: crates/detailcrm_pages/src/analytics.rs ---

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Job;

/// Bucket for jobs whose service row is missing or was deleted.
pub const UNASSIGNED_SERVICE: &str = "Unassigned";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_jobs: usize,
    pub service_revenue: f64,
    pub add_on_revenue: f64,
    pub total_revenue: f64,
    pub average_job_value: f64,
    /// Service name -> job count.
    pub jobs_by_service: BTreeMap<String, usize>,
    /// `YYYY-MM` -> job count. Unscheduled jobs are not counted here.
    pub jobs_by_month: BTreeMap<String, usize>,
    /// Add-on type -> revenue.
    pub add_on_revenue_by_type: BTreeMap<String, f64>,
}

pub fn summarize(jobs: &[Job]) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary {
        total_jobs: jobs.len(),
        ..Default::default()
    };

    for job in jobs {
        let service_name = match &job.service {
            Some(service) => {
                summary.service_revenue += service.price.unwrap_or(0.0);
                service
                    .name
                    .clone()
                    .unwrap_or_else(|| UNASSIGNED_SERVICE.to_string())
            }
            None => UNASSIGNED_SERVICE.to_string(),
        };
        *summary.jobs_by_service.entry(service_name).or_default() += 1;

        if let Some(at) = job.scheduled_at {
            let month = format!("{:04}-{:02}", at.year(), at.month());
            *summary.jobs_by_month.entry(month).or_default() += 1;
        }

        for line in &job.job_add_ons {
            let amount = line.line_total();
            summary.add_on_revenue += amount;
            let kind = line
                .add_on
                .as_ref()
                .map(|a| a.add_on_type.as_str())
                .unwrap_or("standard");
            *summary
                .add_on_revenue_by_type
                .entry(kind.to_string())
                .or_default() += amount;
        }
    }

    summary.total_revenue = summary.service_revenue + summary.add_on_revenue;
    if summary.total_jobs > 0 {
        summary.average_job_value = summary.total_revenue / summary.total_jobs as f64;
    }
    summary
}
