//! Supabase PostgREST client
//!
//! Thin wrapper over the REST interface using the service-role key.
//! Row shaping and error wording live in the paper store, this layer
//! only moves JSON in and out.

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::DbError;

/// Supabase REST client
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    /// Inserts one row and returns the stored representation.
    pub async fn insert_returning(&self, table: &str, row: &Value) -> Result<Value, DbError> {
        let endpoint = self.endpoint(table);
        debug!("insert into {}", endpoint);

        let request = self
            .authed(self.http.post(&endpoint))
            .header("Prefer", "return=representation")
            .json(row);
        let body = self.execute(&endpoint, request).await?;

        // the representation arrives as a one-element array
        match body {
            Value::Array(mut rows) if !rows.is_empty() => Ok(rows.remove(0)),
            other => Ok(other),
        }
    }

    /// Inserts one or more rows without asking for them back.
    pub async fn insert(&self, table: &str, rows: &Value) -> Result<(), DbError> {
        let endpoint = self.endpoint(table);
        debug!("insert into {}", endpoint);

        let request = self
            .authed(self.http.post(&endpoint))
            .header("Prefer", "return=minimal")
            .json(rows);
        self.execute(&endpoint, request).await?;
        Ok(())
    }

    /// Runs a filtered select, returning the raw JSON rows.
    pub async fn select(&self, table: &str, query: &[(&str, &str)]) -> Result<Value, DbError> {
        let endpoint = self.endpoint(table);
        debug!("select from {}", endpoint);

        let request = self.authed(self.http.get(&endpoint)).query(query);
        self.execute(&endpoint, request).await
    }

    /// Deletes the rows matching the given filters.
    pub async fn delete(&self, table: &str, filters: &[(&str, &str)]) -> Result<(), DbError> {
        let endpoint = self.endpoint(table);
        debug!("delete from {}", endpoint);

        let request = self.authed(self.http.delete(&endpoint)).query(filters);
        self.execute(&endpoint, request).await?;
        Ok(())
    }

    async fn execute(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, DbError> {
        let response = request.send().await.map_err(|e| DbError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| DbError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(DbError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message: postgrest_message(&text),
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| DbError::DecodeFailed {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

/// PostgREST errors carry a "message" member; fall back to the raw body.
fn postgrest_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgrest_message_extraction() {
        assert_eq!(
            postgrest_message(r#"{"code":"23505","message":"duplicate key value"}"#),
            "duplicate key value"
        );
        assert_eq!(postgrest_message("gateway timeout"), "gateway timeout");
        assert_eq!(postgrest_message(""), "");
    }
}
