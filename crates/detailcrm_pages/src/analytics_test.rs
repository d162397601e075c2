// --- File: crates/detailcrm_pages/src/analytics_test.rs ---
#[cfg(test)]
mod tests {
    use crate::analytics::{summarize, UNASSIGNED_SERVICE};
    use crate::models::Job;
    use serde_json::json;

    fn job(value: serde_json::Value) -> Job {
        serde_json::from_value(value).expect("job fixture")
    }

    #[test]
    fn test_empty_jobs() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_jobs, 0);
        assert_eq!(summary.total_revenue, 0.0);
        assert_eq!(summary.average_job_value, 0.0);
        assert!(summary.jobs_by_service.is_empty());
    }

    #[test]
    fn test_service_and_add_on_revenue() {
        let jobs = vec![
            job(json!({
                "id": 1,
                "scheduled_at": "2025-04-03T10:00:00Z",
                "service": {"id": 1, "name": "Full detail", "price": 200.0},
                "job_add_ons": [
                    {"quantity": 1, "add_on": {"id": 1, "name": "Clay bar", "price": 50, "type": "upgrade"}},
                    {"price": 300, "add_on": {"id": 2, "name": "Ceramic", "price": 400, "type": "coating_upgrade"}}
                ]
            })),
            job(json!({
                "id": 2,
                "scheduled_at": "2025-04-20T10:00:00Z",
                "service": {"id": 1, "name": "Full detail", "price": 200.0}
            })),
            job(json!({
                "id": 3,
                "scheduled_at": "2025-05-01T08:00:00Z",
                "service": {"id": 2, "name": "Express wash", "price": 50.0},
                "job_add_ons": [
                    {"quantity": 2, "add_on": {"id": 3, "name": "Air freshener", "price": 5}}
                ]
            })),
        ];

        let summary = summarize(&jobs);
        assert_eq!(summary.total_jobs, 3);
        assert_eq!(summary.service_revenue, 450.0);
        assert_eq!(summary.add_on_revenue, 360.0);
        assert_eq!(summary.total_revenue, 810.0);
        assert_eq!(summary.average_job_value, 270.0);
        assert_eq!(summary.jobs_by_service["Full detail"], 2);
        assert_eq!(summary.jobs_by_service["Express wash"], 1);
        assert_eq!(summary.jobs_by_month["2025-04"], 2);
        assert_eq!(summary.jobs_by_month["2025-05"], 1);
        assert_eq!(summary.add_on_revenue_by_type["upgrade"], 50.0);
        assert_eq!(summary.add_on_revenue_by_type["coating_upgrade"], 300.0);
        assert_eq!(summary.add_on_revenue_by_type["standard"], 10.0);
    }

    #[test]
    fn test_unscheduled_job_without_service() {
        let summary = summarize(&[job(json!({"id": "draft"}))]);
        assert_eq!(summary.jobs_by_service[UNASSIGNED_SERVICE], 1);
        assert!(summary.jobs_by_month.is_empty());
        assert_eq!(summary.total_revenue, 0.0);
    }
}
