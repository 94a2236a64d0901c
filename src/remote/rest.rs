use async_trait::async_trait;
use reqwest::Client;

use crate::common::ChatMessage;
use crate::config::RemoteConfig;

use super::store::{MessageStore, StoreError};

/// Truy cập bảng `messages` qua REST endpoint của remote store.
pub struct RestStore {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl RestStore {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/rest/v1/messages", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl MessageStore for RestStore {
    async fn fetch_all(&self) -> Result<Vec<ChatMessage>, StoreError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("select", "id,username,content,created_at"),
                ("order", "created_at.asc"),
            ])
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::BadStatus(status.as_u16()));
        }

        response
            .json::<Vec<ChatMessage>>()
            .await
            .map_err(StoreError::Decode)
    }

    async fn insert(&self, message: &ChatMessage) -> Result<(), StoreError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("apikey", self.api_key.as_str())
            .header("Prefer", "return=minimal")
            .bearer_auth(&self.api_key)
            .json(&[message])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::BadStatus(status.as_u16()));
        }
        Ok(())
    }
}
