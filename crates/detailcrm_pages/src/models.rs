// --- File: crates/detailcrm_pages/src/models.rs ---
//
// Row shapes as the pages consume them. Columns not listed here are ignored,
// so the externally owned schema can grow without breaking deserialization.
// Rows are read with the database's snake_case column names and written to
// page props in camelCase.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accepts both integer and uuid primary keys.
fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn flexible_id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// A `null` column reads as the type's default, same as a missing one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `timestamptz` arrives as RFC 3339, `timestamp` without an offset; the latter is taken as UTC.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Customer {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A lead or account on the client board; stages here are `kind = client`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Client {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub pipeline_stage_id: Option<String>,
    #[serde(default)]
    pub pipeline_stage: Option<PipelineStage>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Car {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PipelineStage {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_archived: bool,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ServiceCategory {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Service {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AddOnType {
    #[default]
    Standard,
    Upgrade,
    CoatingUpgrade,
}

impl AddOnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddOnType::Standard => "standard",
            AddOnType::Upgrade => "upgrade",
            AddOnType::CoatingUpgrade => "coating_upgrade",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AddOn {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub add_on_type: AddOnType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub category_id: Option<String>,
}

/// Link row between a job and an add-on; `price` overrides the catalog price when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct JobAddOn {
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub id: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub add_on: Option<AddOn>,
}

impl JobAddOn {
    pub fn line_total(&self) -> f64 {
        let unit = self
            .price
            .or_else(|| self.add_on.as_ref().and_then(|a| a.price))
            .unwrap_or(0.0);
        unit * f64::from(self.quantity.unwrap_or(1).max(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Job {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub car: Option<Car>,
    #[serde(default)]
    pub service: Option<Service>,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub pipeline_stage_id: Option<String>,
    #[serde(default)]
    pub pipeline_stage: Option<PipelineStage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_add_ons: Vec<JobAddOn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Project {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct GmbReview {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub star_rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reply: Option<String>,
}

/// Per-user calendar preferences; missing or `null` columns take the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"), from = "CalendarSettingsRow")]
pub struct CalendarSettings {
    pub work_start: String,
    pub work_end: String,
    pub slot_minutes: i32,
    pub timezone: String,
}

#[derive(Deserialize)]
struct CalendarSettingsRow {
    #[serde(default)]
    work_start: Option<String>,
    #[serde(default)]
    work_end: Option<String>,
    #[serde(default)]
    slot_minutes: Option<i32>,
    #[serde(default)]
    timezone: Option<String>,
}

impl From<CalendarSettingsRow> for CalendarSettings {
    fn from(row: CalendarSettingsRow) -> Self {
        Self {
            work_start: row.work_start.unwrap_or_else(default_work_start),
            work_end: row.work_end.unwrap_or_else(default_work_end),
            slot_minutes: row.slot_minutes.unwrap_or_else(default_slot_minutes),
            timezone: row.timezone.unwrap_or_else(default_timezone),
        }
    }
}

fn default_work_start() -> String {
    "08:00".to_string()
}

fn default_work_end() -> String {
    "18:00".to_string()
}

fn default_slot_minutes() -> i32 {
    60
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            work_start: default_work_start(),
            work_end: default_work_end(),
            slot_minutes: default_slot_minutes(),
            timezone: default_timezone(),
        }
    }
}

/// Telemetry row; only read for the trailing metrics window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Event {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Token-free projection of an integration row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct IntegrationSummary {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_with_embedded_relations() {
        let job: Job = serde_json::from_value(json!({
            "id": 42,
            "scheduled_at": "2025-03-01T09:30:00+00:00",
            "customer": {"id": "c1", "name": "Dana"},
            "service": {"id": 3, "name": "Full detail", "price": 249.0},
            "pipeline_stage": {"id": 1, "name": "Booked", "position": 0},
            "job_add_ons": [
                {"id": 9, "quantity": 2, "add_on": {"id": 5, "name": "Pet hair", "price": 40, "type": "standard"}}
            ],
            "some_new_column": true
        }))
        .unwrap();

        assert_eq!(job.id, "42");
        assert_eq!(job.customer.as_ref().unwrap().name.as_deref(), Some("Dana"));
        assert_eq!(job.job_add_ons[0].line_total(), 80.0);
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let job: Job = serde_json::from_value(json!({
            "id": "j1",
            "scheduled_at": "2025-03-01T09:30:00"
        }))
        .unwrap();
        assert_eq!(
            job.scheduled_at.unwrap().to_rfc3339(),
            "2025-03-01T09:30:00+00:00"
        );
    }

    #[test]
    fn test_null_columns_keep_the_row() {
        let stage: PipelineStage = serde_json::from_value(json!({
            "id": 4, "name": null, "position": null, "is_archived": null
        }))
        .unwrap();
        assert_eq!(stage.position, None);
        assert!(!stage.is_archived);

        let add_on: AddOn = serde_json::from_value(json!({
            "id": 1, "name": "Wax", "price": null, "type": null, "display_order": null
        }))
        .unwrap();
        assert_eq!(add_on.price, None);
        assert_eq!(add_on.add_on_type, AddOnType::Standard);

        let job: Job = serde_json::from_value(json!({"id": 1, "job_add_ons": null})).unwrap();
        assert!(job.job_add_ons.is_empty());
    }

    #[test]
    fn test_rows_serialize_camel_case() {
        let job: Job = serde_json::from_value(json!({
            "id": 3,
            "scheduled_at": "2025-03-01T09:30:00Z",
            "job_add_ons": [{"add_on": {"id": 1, "name": "Wax", "type": "upgrade"}}]
        }))
        .unwrap();
        let out = serde_json::to_value(&job).unwrap();
        assert!(out.get("scheduledAt").is_some());
        assert!(out.get("scheduled_at").is_none());
        assert_eq!(out["jobAddOns"][0]["addOn"]["type"], "upgrade");
    }

    #[test]
    fn test_add_on_type_column() {
        let add_on: AddOn = serde_json::from_value(json!({
            "id": 1, "name": "Ceramic topper", "price": 150.5, "type": "coating_upgrade"
        }))
        .unwrap();
        assert_eq!(add_on.add_on_type, AddOnType::CoatingUpgrade);

        let untyped: AddOn =
            serde_json::from_value(json!({"id": 2, "name": "Tire shine", "price": 10})).unwrap();
        assert_eq!(untyped.add_on_type, AddOnType::Standard);
    }

    #[test]
    fn test_job_add_on_price_override() {
        let line = JobAddOn {
            id: None,
            price: Some(25.0),
            quantity: None,
            add_on: Some(AddOn {
                id: "1".into(),
                name: Some("Engine bay".into()),
                price: Some(60.0),
                add_on_type: AddOnType::Upgrade,
                display_order: 0,
                category_id: None,
            }),
        };
        assert_eq!(line.line_total(), 25.0);
    }

    #[test]
    fn test_calendar_settings_defaults() {
        let settings: CalendarSettings =
            serde_json::from_value(json!({"slot_minutes": 30, "work_end": null})).unwrap();
        assert_eq!(settings.slot_minutes, 30);
        assert_eq!(settings.work_start, "08:00");
        assert_eq!(settings.work_end, "18:00");
        assert_eq!(settings.timezone, "UTC");

        let out = serde_json::to_value(&settings).unwrap();
        assert_eq!(out["slotMinutes"], 30);
        assert_eq!(out["workStart"], "08:00");
    }

    #[test]
    fn test_integration_summary_drops_tokens() {
        let summary: IntegrationSummary = serde_json::from_value(json!({
            "id": "i1",
            "provider": "gmail",
            "email_address": "shop@example.com",
            "access_token": "ya29.secret",
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        let out = serde_json::to_value(&summary).unwrap();
        assert_eq!(out["emailAddress"], "shop@example.com");
        assert!(out.get("access_token").is_none());
        assert!(out.get("accessToken").is_none());
    }
}
