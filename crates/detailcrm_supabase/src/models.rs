// --- File: crates/detailcrm_supabase/src/models.rs ---

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The user behind an access token, as returned by `GET /auth/v1/user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            role: None,
            user_metadata: Value::Null,
        }
    }
}

/// Body of `POST /auth/v1/admin/users`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub user_metadata: Value,
}

/// Storage bucket as listed by `GET /storage/v1/bucket`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub file_size_limit: Option<u64>,
    #[serde(default)]
    pub allowed_mime_types: Option<Vec<String>>,
}

/// Body of `POST /storage/v1/bucket`.
#[derive(Debug, Clone, Serialize)]
pub struct NewBucket {
    pub id: String,
    pub name: String,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mime_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    Created,
    AlreadyExists,
}
