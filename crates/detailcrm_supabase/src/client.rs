//! Supabase REST client.
//!
//! Talks to the three Supabase services the application uses:
//! GoTrue (`/auth/v1`), PostgREST (`/rest/v1`) and Storage (`/storage/v1`).
//! User-facing calls authenticate with the caller's access token and the anon
//! key; admin calls use the service-role key.

use async_trait::async_trait;
use detailcrm_common::HTTP_CLIENT;
use detailcrm_config::SupabaseConfig;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::SupabaseError;
use crate::models::{AuthUser, Bucket, BucketStatus, CreateUserRequest, NewBucket};
use crate::query::TableQuery;

/// Client for a single Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

impl SupabaseClient {
    /// Creates a client sharing the process-wide HTTP connection pool.
    pub fn new(config: &SupabaseConfig) -> Self {
        Self::with_http_client(config, HTTP_CLIENT.clone())
    }

    pub fn with_http_client(config: &SupabaseConfig, http: Client) -> Self {
        Self {
            http,
            base_url: config.base_url().to_string(),
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn user_request(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    fn admin_request(&self, builder: RequestBuilder) -> Result<RequestBuilder, SupabaseError> {
        let key = self.service_role_key.as_deref().ok_or_else(|| {
            SupabaseError::ConfigError("SUPABASE_SERVICE_ROLE_KEY is not set".to_string())
        })?;
        Ok(builder.header("apikey", key).bearer_auth(key))
    }

    async fn check(response: Response) -> Result<Response, SupabaseError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(SupabaseError::from_response(status, &body))
    }

    /// Create a confirmed user through the GoTrue admin API.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<AuthUser, SupabaseError> {
        let url = format!("{}/auth/v1/admin/users", self.base_url);
        let response = self
            .admin_request(self.http.post(&url))?
            .json(request)
            .send()
            .await?;
        let user: AuthUser = Self::check(response).await?.json().await?;
        info!("Created auth user {}", user.id);
        Ok(user)
    }

    pub async fn list_buckets(&self) -> Result<Vec<Bucket>, SupabaseError> {
        let url = format!("{}/storage/v1/bucket", self.base_url);
        let response = self.admin_request(self.http.get(&url))?.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn create_bucket(&self, bucket: &NewBucket) -> Result<(), SupabaseError> {
        let url = format!("{}/storage/v1/bucket", self.base_url);
        let response = self
            .admin_request(self.http.post(&url))?
            .json(bucket)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Create the bucket unless a bucket with the same id already exists.
    pub async fn ensure_bucket(&self, bucket: &NewBucket) -> Result<BucketStatus, SupabaseError> {
        let existing = self.list_buckets().await?;
        if existing.iter().any(|b| b.id == bucket.id) {
            info!("Storage bucket '{}' already exists", bucket.id);
            return Ok(BucketStatus::AlreadyExists);
        }
        match self.create_bucket(bucket).await {
            Ok(()) => Ok(BucketStatus::Created),
            // lost a race with another setup run
            Err(SupabaseError::ApiError { message, .. })
                if message.to_lowercase().contains("already exists") =>
            {
                Ok(BucketStatus::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, SupabaseError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .user_request(self.http.get(&url), access_token)
            .send()
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Access token rejected by Supabase auth");
                Ok(None)
            }
            _ => Ok(Some(Self::check(response).await?.json().await?)),
        }
    }

    async fn select(
        &self,
        access_token: &str,
        query: &TableQuery,
    ) -> Result<Vec<Value>, SupabaseError> {
        debug!("select from {}", query.table());
        let response = self
            .user_request(self.http.get(self.rest_url(query.table())), access_token)
            .query(&query.to_query_pairs())
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert(
        &self,
        access_token: &str,
        table: &str,
        row: Value,
    ) -> Result<Vec<Value>, SupabaseError> {
        debug!("insert into {}", table);
        let response = self
            .user_request(self.http.post(self.rest_url(table)), access_token)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, access_token: &str, query: &TableQuery) -> Result<(), SupabaseError> {
        debug!("delete from {}", query.table());
        let response = self
            .user_request(self.http.delete(self.rest_url(query.table())), access_token)
            .header("Prefer", "return=minimal")
            .query(&query.to_query_pairs())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
