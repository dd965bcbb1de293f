//! HTTP transport to the coordination engine
//!
//! The reconciliation session talks to the engine through the
//! [`EngineTransport`] trait so tests can substitute an in-memory fake.

use huddle_common::api::types::{
    ActionItemInfo, ActionItemsResponse, ErrorResponse, ToggleRequest, ToggleResponse,
    UserProfile,
};
use huddle_common::{Error, Result};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

/// Total per-request deadline unless the caller picks their own
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Server operations the client layer depends on.
///
/// Polling callers only use the read methods; toggling is the single
/// mutation path.
pub trait EngineTransport: Send + Sync {
    fn toggle_interest(
        &self,
        user_id: Uuid,
        venue_id: Uuid,
    ) -> impl Future<Output = Result<ToggleResponse>> + Send;

    fn interested_venues(&self, user_id: Uuid)
        -> impl Future<Output = Result<Vec<Uuid>>> + Send;

    fn pending_action_items(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<ActionItemInfo>>> + Send;
}

/// reqwest-backed transport for a running huddle-ce instance
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// `base_url` without a trailing slash, e.g. `http://127.0.0.1:5850`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Transport with an explicit per-request deadline.
    ///
    /// Every request carries a total timeout so a stalled engine surfaces
    /// as `Error::Transport` instead of pending forever; sessions then run
    /// their revert path and release the venue's in-flight guard.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_err)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

impl EngineTransport for HttpTransport {
    fn toggle_interest(
        &self,
        user_id: Uuid,
        venue_id: Uuid,
    ) -> impl Future<Output = Result<ToggleResponse>> + Send {
        let http = self.http.clone();
        let url = format!("{}/interests", self.base_url);
        async move {
            let response = http
                .post(&url)
                .json(&ToggleRequest { user_id, venue_id })
                .send()
                .await
                .map_err(transport_err)?;
            decode(response).await
        }
    }

    fn interested_venues(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Uuid>>> + Send {
        let http = self.http.clone();
        let url = format!("{}/users/{}", self.base_url, user_id);
        async move {
            let response = http.get(&url).send().await.map_err(transport_err)?;
            let profile: UserProfile = decode(response).await?;
            Ok(profile.interested_venues.into_iter().map(|v| v.id).collect())
        }
    }

    fn pending_action_items(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<ActionItemInfo>>> + Send {
        let http = self.http.clone();
        let url = format!("{}/action-items?user_id={}", self.base_url, user_id);
        async move {
            let response = http.get(&url).send().await.map_err(transport_err)?;
            let body: ActionItemsResponse = decode(response).await?;
            Ok(body.action_items)
        }
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(transport_err);
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("HTTP {status}"));

    Err(match status.as_u16() {
        404 => Error::NotFound(message),
        409 => Error::InvalidState(message),
        _ => Error::Transport(message),
    })
}

fn transport_err(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}
