// In crates/store/src/upstash.rs

use crate::{Error, KvStore, Result};
use app_config::types::StoreSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// A client for Upstash Redis over its REST API.
///
/// Every command is a `POST` of a JSON array (`["GET", "key"]`) to the
/// database URL. Replies carry either `result` or `error`.
#[derive(Debug, Clone)]
pub struct UpstashStore {
    /// The persistent HTTP client.
    http_client: Client,
    /// The REST endpoint of the database.
    base_url: String,
    /// The REST bearer token.
    token: String,
}

impl UpstashStore {
    /// Constructs a new client from the store settings.
    pub fn new(settings: &StoreSettings) -> Result<Self> {
        let base_url = settings
            .url
            .clone()
            .ok_or_else(|| Error::Misconfigured("store.url is not set".into()))?;
        let token = settings
            .token
            .clone()
            .ok_or_else(|| Error::Misconfigured("store.token is not set".into()))?;
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Runs one Redis command and returns its `result` field.
    async fn command(&self, args: &[&str]) -> Result<Value> {
        let response = self
            .http_client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;
        let mut value: Value = serde_json::from_str(&text).map_err(|_| {
            Error::Backend(format!("HTTP {status}: {}", text.chars().take(200).collect::<String>()))
        })?;

        // Upstash reports command errors in an `error` field, with or without a 4xx.
        if let Some(msg) = value.get("error").and_then(Value::as_str) {
            return Err(Error::Backend(msg.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Backend(format!("HTTP {status}")));
        }

        Ok(value.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }
}

#[async_trait]
impl KvStore for UpstashStore {
    fn name(&self) -> &'static str {
        "UpstashStore"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.command(&["GET", key]).await?;
        Ok(match result {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.command(&["SET", key, value]).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.command(&["DEL", key]).await?;
        Ok(())
    }
}
