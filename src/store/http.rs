use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::app_config::StoreConfig;
use crate::errors::StoreError;
use crate::models::{
    SelectWordPayload, SettingKey, SettingRecord, SettingValueBody, Word, WordId, WordPatch,
};
use crate::store::WordStore;

/// HTTP client for the remote word store
#[derive(Debug, Clone)]
pub struct HttpWordStore {
    /// HTTP client for API requests
    client: Client,
    /// Base URL every resource path is resolved against
    base_url: Url,
}

impl HttpWordStore {
    /// Create a new client for the given base URL
    ///
    /// No timeout is configured, a hung request stays pending.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::build(base_url, None)
    }

    /// Create a client from the store section of the configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::build(&config.base_url, config.timeout_secs.map(Duration::from_secs))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| StoreError::NetworkFailure(format!("Invalid store URL '{}': {}", base_url, e)))?;

        // Url::join drops the last segment unless the path ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a resource path such as `words/selected`
    pub fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| StoreError::NetworkFailure(format!("Invalid resource path '{}': {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, StoreError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    /// Send a request and turn any non-success status into a failure
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(|e| {
            error!("Word store request failed: {}", e);
            StoreError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Word store error ({}): {}", status, error_text);
            return Err(StoreError::status(status.as_u16(), error_text));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse word store response: {}", e);
            StoreError::NetworkFailure(format!("Failed to parse response: {}", e))
        })
    }
}

#[async_trait]
impl WordStore for HttpWordStore {
    async fn list_words(&self) -> Result<Vec<Word>, StoreError> {
        let request = self.request(Method::GET, "words")?;
        self.send_json(request).await
    }

    async fn list_selected(&self) -> Result<Vec<Word>, StoreError> {
        let request = self.request(Method::GET, "words/selected")?;
        self.send_json(request).await
    }

    async fn select_words(&self, payload: &[SelectWordPayload]) -> Result<Vec<Word>, StoreError> {
        let request = self.request(Method::POST, "words/select-words")?.json(payload);
        self.send_json(request).await
    }

    async fn update_word(&self, id: WordId, patch: &WordPatch) -> Result<Word, StoreError> {
        let request = self.request(Method::PATCH, &format!("words/{}", id))?.json(patch);
        self.send_json(request).await
    }

    async fn clear_selected(&self) -> Result<(), StoreError> {
        // The response body is opaque, only the status matters
        let request = self.request(Method::POST, "words/clear-selected")?;
        self.send(request).await?;
        Ok(())
    }

    async fn get_setting(&self, key: SettingKey) -> Result<SettingRecord, StoreError> {
        let request = self.request(Method::GET, &format!("settings/{}", key))?;
        self.send_json(request).await
    }

    async fn put_setting(&self, key: SettingKey, value: &str) -> Result<(), StoreError> {
        let body = SettingValueBody { value: value.to_string() };
        let request = self.request(Method::PUT, &format!("settings/{}", key))?.json(&body);
        self.send(request).await?;
        Ok(())
    }
}
