//! In-memory [`Backend`] for handler tests.
//!
//! Rows are returned per table without evaluating filters; every call is
//! recorded so tests can assert on exactly which queries a handler issued.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::backend::Backend;
use crate::error::SupabaseError;
use crate::models::AuthUser;
use crate::query::TableQuery;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetUser(String),
    Select(TableQuery),
    Insert { table: String, row: Value },
    Delete(TableQuery),
}

#[derive(Default)]
pub struct FakeBackend {
    users: Mutex<HashMap<String, AuthUser>>,
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failing_tables: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `access_token` as belonging to `user_id`.
    pub fn with_user(self, access_token: &str, user_id: &str) -> Self {
        self.users
            .lock()
            .unwrap()
            .insert(access_token.to_string(), AuthUser::new(user_id));
        self
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables
            .lock()
            .unwrap()
            .insert(table.to_string(), rows);
        self
    }

    /// Make every operation on `table` fail with a 500 from the backend.
    pub fn failing(self, table: &str) -> Self {
        self.failing_tables
            .lock()
            .unwrap()
            .insert(table.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// All calls except session lookups.
    pub fn data_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::GetUser(_)))
            .collect()
    }

    pub fn selects(&self) -> Vec<TableQuery> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Select(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<TableQuery> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    pub fn inserts(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Insert { table, row } => Some((table, row)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_table(&self, table: &str) -> Result<(), SupabaseError> {
        if self.failing_tables.lock().unwrap().contains(table) {
            return Err(SupabaseError::ApiError {
                status_code: 500,
                message: format!("simulated failure on {table}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, SupabaseError> {
        self.record(Call::GetUser(access_token.to_string()));
        Ok(self.users.lock().unwrap().get(access_token).cloned())
    }

    async fn select(
        &self,
        _access_token: &str,
        query: &TableQuery,
    ) -> Result<Vec<Value>, SupabaseError> {
        self.record(Call::Select(query.clone()));
        self.check_table(query.table())?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(query.table())
            .cloned()
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        _access_token: &str,
        table: &str,
        row: Value,
    ) -> Result<Vec<Value>, SupabaseError> {
        self.record(Call::Insert {
            table: table.to_string(),
            row: row.clone(),
        });
        self.check_table(table)?;
        Ok(vec![row])
    }

    async fn delete(&self, _access_token: &str, query: &TableQuery) -> Result<(), SupabaseError> {
        self.record(Call::Delete(query.clone()));
        self.check_table(query.table())
    }
}
