// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Realtime-store client (Firebase Realtime Database REST API).
//!
//! Holds avatar bytes and shared contact snapshots:
//! - `avatars/{uid}`
//! - `contactAvatars/{contactId}`
//! - `sharedContacts/{code}`
//!
//! Offline mode keeps values in memory so tests can exercise the
//! avatar and snapshot paths without a network.

use crate::error::AppError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

/// Realtime-store client.
#[derive(Clone)]
pub struct RealtimeDb {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Remote {
        http: reqwest::Client,
        base_url: String,
        auth: Option<String>,
    },
    Memory(Arc<DashMap<String, serde_json::Value>>),
}

/// Avatar value stored at `avatars/{uid}` and `contactAvatars/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarValue {
    pub avatar_base64: String,
    /// Owner email, only set for user avatars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RealtimeDb {
    /// Create a client for the database at `base_url`.
    ///
    /// `auth` is appended as the `auth` query parameter when present.
    pub fn new(base_url: &str, auth: Option<String>) -> Self {
        tracing::info!(url = base_url, "Realtime store client initialized");
        Self {
            backend: Backend::Remote {
                http: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                auth,
            },
        }
    }

    /// Create an in-memory store for testing (offline mode).
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    /// Read the value at `path`, `None` when absent.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, AppError> {
        let value = match &self.backend {
            Backend::Remote {
                http,
                base_url,
                auth,
            } => {
                let response = http
                    .get(Self::url(base_url, path))
                    .query(&Self::auth_query(auth))
                    .send()
                    .await
                    .map_err(|e| AppError::Realtime(e.to_string()))?;

                let response = Self::check_response(response).await?;
                response
                    .json::<serde_json::Value>()
                    .await
                    .map_err(|e| AppError::Realtime(format!("JSON parse error: {}", e)))?
            }
            Backend::Memory(map) => map
                .get(path)
                .map(|v| v.value().clone())
                .unwrap_or(serde_json::Value::Null),
        };

        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::Realtime(format!("Unexpected value at {}: {}", path, e)))
    }

    /// Overwrite the value at `path`.
    pub async fn set<T: Serialize>(&self, path: &str, value: &T) -> Result<(), AppError> {
        match &self.backend {
            Backend::Remote {
                http,
                base_url,
                auth,
            } => {
                let response = http
                    .put(Self::url(base_url, path))
                    .query(&Self::auth_query(auth))
                    .json(value)
                    .send()
                    .await
                    .map_err(|e| AppError::Realtime(e.to_string()))?;
                Self::check_response(response).await?;
            }
            Backend::Memory(map) => {
                let value = serde_json::to_value(value)
                    .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
                map.insert(path.to_string(), value);
            }
        }
        Ok(())
    }

    /// Remove the value at `path`. Removing an absent path succeeds.
    pub async fn remove(&self, path: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Remote {
                http,
                base_url,
                auth,
            } => {
                let response = http
                    .delete(Self::url(base_url, path))
                    .query(&Self::auth_query(auth))
                    .send()
                    .await
                    .map_err(|e| AppError::Realtime(e.to_string()))?;
                Self::check_response(response).await?;
            }
            Backend::Memory(map) => {
                map.remove(path);
            }
        }
        Ok(())
    }

    /// Whether any value exists at `path`.
    pub async fn exists(&self, path: &str) -> Result<bool, AppError> {
        Ok(self.get::<serde_json::Value>(path).await?.is_some())
    }

    fn url(base_url: &str, path: &str) -> String {
        format!("{}/{}.json", base_url, path)
    }

    fn auth_query(auth: &Option<String>) -> Vec<(&'static str, String)> {
        auth.iter().map(|a| ("auth", a.clone())).collect()
    }

    /// Check response status and map failures.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        // Security rules rejected the request
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::PermissionDenied(format!("HTTP {}: {}", status, body)));
        }

        Err(AppError::Realtime(format!("HTTP {}: {}", status, body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_set_get_remove() {
        let db = RealtimeDb::new_mock();
        let path = crate::db::paths::contact_avatar("c1");

        assert!(db.get::<AvatarValue>(&path).await.unwrap().is_none());

        let value = AvatarValue {
            avatar_base64: "AAAA".to_string(),
            email: None,
        };
        db.set(&path, &value).await.unwrap();
        assert!(db.exists(&path).await.unwrap());

        let fetched: AvatarValue = db.get(&path).await.unwrap().unwrap();
        assert_eq!(fetched.avatar_base64, "AAAA");

        db.remove(&path).await.unwrap();
        assert!(!db.exists(&path).await.unwrap());
        // Removing again is not an error
        db.remove(&path).await.unwrap();
    }

    #[test]
    fn test_url_and_auth_query() {
        assert_eq!(
            RealtimeDb::url("https://x.app", "sharedContacts/abc"),
            "https://x.app/sharedContacts/abc.json"
        );
        assert!(RealtimeDb::auth_query(&None).is_empty());
        assert_eq!(
            RealtimeDb::auth_query(&Some("s".to_string())),
            vec![("auth", "s".to_string())]
        );
    }
}
