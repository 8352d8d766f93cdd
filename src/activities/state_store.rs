//! persist-state / get-state / delete-state (spec §4.6).
//!
//! Dapr-style key/value access against the configured state store;
//! non-string values are JSON-encoded before being written.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ActivityResult, Activities};

impl Activities {
    pub async fn set_state(&self, key: &str, value: &Value) -> ActivityResult<()> {
        let url = self.config.state_store_url();
        let body = serde_json::json!([{ "key": key, "value": value }]);
        debug!(key, "persist-state");
        self.http.post(&url).json(&body).send().await?;
        Ok(())
    }

    pub async fn get_state<T: DeserializeOwned>(&self, key: &str) -> ActivityResult<Option<T>> {
        let url = format!("{}/{}", self.config.state_store_url(), key);
        debug!(key, "get-state");
        let resp = self.http.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub async fn delete_state(&self, key: &str) -> ActivityResult<()> {
        let url = format!("{}/{}", self.config.state_store_url(), key);
        debug!(key, "delete-state");
        self.http.delete(&url).send().await?;
        Ok(())
    }
}
