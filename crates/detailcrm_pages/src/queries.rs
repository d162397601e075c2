// --- File: crates/detailcrm_pages/src/queries.rs ---
//
// The PostgREST reads each page issues. Kept apart from the loaders so the
// exact filters can be asserted without a backend.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use detailcrm_supabase::TableQuery;

pub const JOBS_TABLE: &str = "jobs";
pub const CUSTOMERS_TABLE: &str = "customers";
pub const CLIENTS_TABLE: &str = "clients";
pub const PIPELINE_STAGES_TABLE: &str = "pipeline_stages";
pub const SERVICES_TABLE: &str = "services";
pub const SERVICE_CATEGORIES_TABLE: &str = "service_categories";
pub const ADD_ONS_TABLE: &str = "add_ons";
pub const PROJECTS_TABLE: &str = "projects";
pub const EVENTS_TABLE: &str = "events";
pub const GMB_REVIEWS_TABLE: &str = "gmb_reviews";
pub const CALENDAR_SETTINGS_TABLE: &str = "calendar_settings";
pub const GOOGLE_CALENDAR_INTEGRATIONS_TABLE: &str = "google_calendar_integrations";
pub const EMAIL_INTEGRATIONS_TABLE: &str = "email_integrations";
pub const GMB_INTEGRATIONS_TABLE: &str = "gmb_integrations";

pub const STAGE_KIND_JOB: &str = "job";
pub const STAGE_KIND_CLIENT: &str = "client";

pub const DASHBOARD_LIMIT: usize = 10;
pub const METRICS_WINDOW_DAYS: i64 = 30;

/// Jobs with everything the board and calendar cards render.
const JOB_SELECT: &str = "
    *,
    customer:customers(*),
    car:cars(*),
    service:services(*),
    pipeline_stage:pipeline_stages(*),
    job_add_ons(*, add_on:add_ons(*))
";

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn jobs() -> TableQuery {
    TableQuery::from(JOBS_TABLE)
        .select(JOB_SELECT)
        .order("scheduled_at", true)
}

pub fn upcoming_jobs(now: DateTime<Utc>) -> TableQuery {
    TableQuery::from(JOBS_TABLE)
        .select(JOB_SELECT)
        .gte("scheduled_at", timestamp(now))
        .order("scheduled_at", true)
        .limit(DASHBOARD_LIMIT)
}

pub fn recent_customers() -> TableQuery {
    TableQuery::from(CUSTOMERS_TABLE)
        .select("*")
        .order("created_at", false)
        .limit(DASHBOARD_LIMIT)
}

/// Non-archived stages of one board, in column order.
pub fn active_stages(kind: &str) -> TableQuery {
    TableQuery::from(PIPELINE_STAGES_TABLE)
        .select("*")
        .eq("kind", kind)
        .is("is_archived", Some(false))
        .order("position", true)
}

/// Every job stage, archived ones included, for the settings editor.
pub fn all_job_stages() -> TableQuery {
    TableQuery::from(PIPELINE_STAGES_TABLE)
        .select("*")
        .eq("kind", STAGE_KIND_JOB)
        .order("position", true)
}

pub fn clients() -> TableQuery {
    TableQuery::from(CLIENTS_TABLE)
        .select("*, pipeline_stage:pipeline_stages(*)")
        .order("created_at", false)
}

pub fn services() -> TableQuery {
    TableQuery::from(SERVICES_TABLE)
        .select("*")
        .order("display_order", true)
}

pub fn service_categories() -> TableQuery {
    TableQuery::from(SERVICE_CATEGORIES_TABLE)
        .select("*")
        .order("display_order", true)
}

pub fn add_ons() -> TableQuery {
    TableQuery::from(ADD_ONS_TABLE)
        .select("*")
        .order("display_order", true)
}

pub fn projects() -> TableQuery {
    TableQuery::from(PROJECTS_TABLE)
        .select("*")
        .order("created_at", false)
}

/// Events in the trailing metrics window, newest first.
pub fn recent_events(now: DateTime<Utc>) -> TableQuery {
    let since = now - Duration::days(METRICS_WINDOW_DAYS);
    TableQuery::from(EVENTS_TABLE)
        .select("*")
        .gte("created_at", timestamp(since))
        .order("created_at", false)
}

pub fn gmb_reviews() -> TableQuery {
    TableQuery::from(GMB_REVIEWS_TABLE)
        .select("*")
        .order("create_time", false)
}

pub fn calendar_settings(user_id: &str) -> TableQuery {
    TableQuery::from(CALENDAR_SETTINGS_TABLE)
        .select("*")
        .eq("user_id", user_id)
        .limit(1)
}

// Integration reads never select token columns.

pub fn google_calendar_integrations(user_id: &str) -> TableQuery {
    TableQuery::from(GOOGLE_CALENDAR_INTEGRATIONS_TABLE)
        .select("id, created_at")
        .eq("user_id", user_id)
}

pub fn email_integrations(user_id: &str) -> TableQuery {
    TableQuery::from(EMAIL_INTEGRATIONS_TABLE)
        .select("id, provider, email_address, created_at")
        .eq("user_id", user_id)
        .order("created_at", true)
}

pub fn gmb_integrations(user_id: &str) -> TableQuery {
    TableQuery::from(GMB_INTEGRATIONS_TABLE)
        .select("id, created_at")
        .eq("user_id", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pair<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_upcoming_jobs_window_and_limit() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let pairs = upcoming_jobs(now).to_query_pairs();
        assert_eq!(pair(&pairs, "scheduled_at"), Some("gte.2025-06-01T12:00:00Z"));
        assert_eq!(pair(&pairs, "limit"), Some("10"));
        assert_eq!(pair(&pairs, "order"), Some("scheduled_at.asc"));
        assert!(pair(&pairs, "select")
            .unwrap()
            .contains("job_add_ons(*,add_on:add_ons(*))"));
    }

    #[test]
    fn test_active_stages_filters_archived() {
        let query = active_stages(STAGE_KIND_CLIENT);
        assert_eq!(query.filter_for("kind"), Some("eq.client"));
        assert_eq!(query.filter_for("is_archived"), Some("is.false"));
        assert_eq!(all_job_stages().filter_for("is_archived"), None);
    }

    #[test]
    fn test_recent_events_thirty_day_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap();
        let query = recent_events(now);
        assert_eq!(query.filter_for("created_at"), Some("gte.2025-03-01T00:00:00Z"));
        assert_eq!(
            pair(&query.to_query_pairs(), "order"),
            Some("created_at.desc")
        );
    }

    #[test]
    fn test_integration_reads_skip_tokens() {
        for query in [
            google_calendar_integrations("u"),
            email_integrations("u"),
            gmb_integrations("u"),
        ] {
            let select = pair(&query.to_query_pairs(), "select").unwrap().to_string();
            assert!(!select.contains("token"), "{select}");
            assert!(!select.contains('*'), "{select}");
            assert_eq!(query.filter_for("user_id"), Some("eq.u"));
        }
    }
}
