// --- File: crates/detailcrm_pages/src/loader.rs ---
//
// One `load_*` function per page. Each takes an already resolved session;
// the redirect for anonymous callers happens in the handlers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use detailcrm_supabase::{Backend, Session, TableQuery};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::analytics::{summarize, AnalyticsSummary};
use crate::models::{
    AddOn, CalendarSettings, Client, Customer, Event, GmbReview, IntegrationSummary, Job,
    PipelineStage, Project, Service, ServiceCategory,
};
use crate::queries::{self, STAGE_KIND_CLIENT, STAGE_KIND_JOB};

pub const GOOGLE_CALENDAR_PROVIDER: &str = "google_calendar";
pub const GMB_PROVIDER: &str = "gmb";

/// What a loader needs: the backend and the caller's session.
#[derive(Clone)]
pub struct PageContext {
    backend: Arc<dyn Backend>,
    session: Session,
}

impl PageContext {
    pub fn new(backend: Arc<dyn Backend>, session: Session) -> Self {
        Self { backend, session }
    }

    pub fn user_id(&self) -> &str {
        self.session.user_id()
    }

    /// Run a read query; a failed query yields no rows, and a row that
    /// cannot be decoded is logged and left out.
    pub async fn rows_or_empty<T>(&self, query: TableQuery) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        let rows = match self
            .backend
            .select(&self.session.access_token, &query)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error fetching {}: {}", query.table(), e);
                return Vec::new();
            }
        };
        rows.into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("Skipping undecodable {} row: {}", query.table(), e);
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProps {
    pub upcoming_jobs: Vec<Job>,
    pub recent_customers: Vec<Customer>,
    pub stages: Vec<PipelineStage>,
}

pub async fn load_dashboard(ctx: &PageContext, now: DateTime<Utc>) -> DashboardProps {
    let (upcoming_jobs, recent_customers, stages) = tokio::join!(
        ctx.rows_or_empty(queries::upcoming_jobs(now)),
        ctx.rows_or_empty(queries::recent_customers()),
        ctx.rows_or_empty(queries::active_stages(STAGE_KIND_JOB)),
    );
    DashboardProps {
        upcoming_jobs,
        recent_customers,
        stages,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardProps {
    pub stages: Vec<PipelineStage>,
    pub jobs: Vec<Job>,
    pub client_stages: Vec<PipelineStage>,
    pub clients: Vec<Client>,
}

pub async fn load_board(ctx: &PageContext) -> BoardProps {
    let (stages, jobs, client_stages, clients) = tokio::join!(
        ctx.rows_or_empty(queries::active_stages(STAGE_KIND_JOB)),
        ctx.rows_or_empty(queries::jobs()),
        ctx.rows_or_empty(queries::active_stages(STAGE_KIND_CLIENT)),
        ctx.rows_or_empty(queries::clients()),
    );
    BoardProps {
        stages,
        jobs,
        client_stages,
        clients,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarProps {
    pub jobs: Vec<Job>,
    pub settings: CalendarSettings,
    pub google_calendar_connected: bool,
}

/// First settings row for the user, or defaults. An unknown time zone falls back to UTC.
async fn calendar_settings(ctx: &PageContext) -> CalendarSettings {
    let mut settings = ctx
        .rows_or_empty::<CalendarSettings>(queries::calendar_settings(ctx.user_id()))
        .await
        .into_iter()
        .next()
        .unwrap_or_default();

    if settings.timezone.parse::<Tz>().is_err() {
        warn!(
            "Unknown calendar timezone '{}' for user {}, using UTC",
            settings.timezone,
            ctx.user_id()
        );
        settings.timezone = CalendarSettings::default().timezone;
    }
    settings
}

pub async fn load_calendar(ctx: &PageContext) -> CalendarProps {
    let (jobs, settings, gcal) = tokio::join!(
        ctx.rows_or_empty(queries::jobs()),
        calendar_settings(ctx),
        ctx.rows_or_empty::<IntegrationSummary>(queries::google_calendar_integrations(
            ctx.user_id()
        )),
    );
    CalendarProps {
        jobs,
        settings,
        google_calendar_connected: !gcal.is_empty(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsProps {
    pub jobs: Vec<Job>,
    pub services: Vec<Service>,
    pub add_ons: Vec<AddOn>,
    pub categories: Vec<ServiceCategory>,
    pub summary: AnalyticsSummary,
}

pub async fn load_analytics(ctx: &PageContext) -> AnalyticsProps {
    let (jobs, services, add_ons, categories) = tokio::join!(
        ctx.rows_or_empty::<Job>(queries::jobs()),
        ctx.rows_or_empty(queries::services()),
        ctx.rows_or_empty(queries::add_ons()),
        ctx.rows_or_empty(queries::service_categories()),
    );
    let summary = summarize(&jobs);
    AnalyticsProps {
        jobs,
        services,
        add_ons,
        categories,
        summary,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsProps {
    pub events: Vec<Event>,
    pub projects: Vec<Project>,
}

pub async fn load_metrics(ctx: &PageContext, now: DateTime<Utc>) -> MetricsProps {
    let (events, projects) = tokio::join!(
        ctx.rows_or_empty(queries::recent_events(now)),
        ctx.rows_or_empty(queries::projects()),
    );
    MetricsProps { events, projects }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsProps {
    pub integrations: Vec<IntegrationSummary>,
    pub reviews: Vec<GmbReview>,
}

fn tag_provider(rows: Vec<IntegrationSummary>, provider: &str) -> Vec<IntegrationSummary> {
    rows.into_iter()
        .map(|mut row| {
            row.provider.get_or_insert_with(|| provider.to_string());
            row
        })
        .collect()
}

pub async fn load_reviews(ctx: &PageContext) -> ReviewsProps {
    let (integrations, reviews) = tokio::join!(
        ctx.rows_or_empty(queries::gmb_integrations(ctx.user_id())),
        ctx.rows_or_empty(queries::gmb_reviews()),
    );
    ReviewsProps {
        integrations: tag_provider(integrations, GMB_PROVIDER),
        reviews,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsIntegrations {
    pub google_calendar: Vec<IntegrationSummary>,
    pub email: Vec<IntegrationSummary>,
    pub gmb: Vec<IntegrationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsProps {
    pub services: Vec<Service>,
    pub categories: Vec<ServiceCategory>,
    pub add_ons: Vec<AddOn>,
    pub stages: Vec<PipelineStage>,
    pub calendar_settings: CalendarSettings,
    pub integrations: SettingsIntegrations,
}

pub async fn load_settings(ctx: &PageContext) -> SettingsProps {
    let user_id = ctx.user_id();
    let (services, categories, add_ons, stages, calendar_settings, gcal, email, gmb) = tokio::join!(
        ctx.rows_or_empty(queries::services()),
        ctx.rows_or_empty(queries::service_categories()),
        ctx.rows_or_empty(queries::add_ons()),
        ctx.rows_or_empty(queries::all_job_stages()),
        calendar_settings(ctx),
        ctx.rows_or_empty(queries::google_calendar_integrations(user_id)),
        ctx.rows_or_empty(queries::email_integrations(user_id)),
        ctx.rows_or_empty(queries::gmb_integrations(user_id)),
    );
    SettingsProps {
        services,
        categories,
        add_ons,
        stages,
        calendar_settings,
        integrations: SettingsIntegrations {
            google_calendar: tag_provider(gcal, GOOGLE_CALENDAR_PROVIDER),
            email,
            gmb: tag_provider(gmb, GMB_PROVIDER),
        },
    }
}
