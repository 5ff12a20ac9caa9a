//! The single chokepoint for HTTP calls to the API.
//!
//! [`ApiClient::request`] attaches the bearer token, runs the refresh
//! protocol on a 401, retries the original call at most once, and turns every
//! non-2xx answer into a [`ClientEvent`] notification plus an error.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use taskboard_core::types::DbId;
use tokio::sync::{broadcast, Mutex};
use validator::Validate;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::{ClientEvent, ClientEvents, LoginReason, Route};
use crate::models::{
    Envelope, LoginForm, LoginResponse, NewTask, Task, TaskChanges, TaskList, TokenPair, UserInfo,
};
use crate::token_store::{FileTokenStore, TokenStore};

/// Shown when a 401 cannot be recovered.
pub const REAUTH_MESSAGE: &str = "Необходима повторная авторизация";

/// Fallback when a failed response carries no message.
pub const GENERIC_ERROR_MESSAGE: &str = "Ошибка запроса";

const LOGIN_PATH: &str = "/api/auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";
const LOGOUT_PATH: &str = "/api/auth/logout";

/// How concurrent 401s coordinate their refresh attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// One refresh at a time. A caller that queued behind another caller's
    /// successful refresh reuses the new pair instead of presenting the
    /// already-consumed refresh token.
    #[default]
    SingleFlight,
    /// Every 401 runs its own refresh. Concurrent callers race on the same
    /// refresh token and all but one lose their session.
    Independent,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    events: ClientEvents,
    policy: RefreshPolicy,
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            events: ClientEvents::default(),
            policy: RefreshPolicy::default(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Client for the configured server, persisting tokens to the configured file.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.api_url.clone(),
            Arc::new(FileTokenStore::new(config.token_file.clone())),
        )
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // -----------------------------------------------------------------------
    // Core request path
    // -----------------------------------------------------------------------

    /// Issue a request and return the parsed JSON body (`{}` for non-JSON
    /// successes).
    ///
    /// With `auth`, a 401 triggers [`refresh_tokens`](Self::refresh_tokens)
    /// and, on success, exactly one retry with the new access token. A failed
    /// refresh clears the token store and requests a redirect to login.
    /// Transport errors are returned immediately and never retried.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
        auth: bool,
    ) -> Result<Value, ClientError> {
        let access = if auth { self.tokens.access_token() } else { None };
        let mut response = self.send(&method, path, body, access.as_deref()).await?;

        if auth && response.status() == StatusCode::UNAUTHORIZED {
            if self.refresh_after(access.as_deref()).await {
                let fresh = self.tokens.access_token();
                response = self.send(&method, path, body, fresh.as_deref()).await?;
            } else {
                self.force_login();
                return Err(ClientError::ReauthRequired);
            }
        }

        self.finish(response).await
    }

    pub async fn get(&self, path: &str, auth: bool) -> Result<Value, ClientError> {
        self.request(path, Method::GET, None, auth).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        auth: bool,
    ) -> Result<Value, ClientError> {
        self.request(path, Method::POST, body, auth).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Option<&Value>,
        auth: bool,
    ) -> Result<Value, ClientError> {
        self.request(path, Method::PUT, body, auth).await
    }

    pub async fn delete(&self, path: &str, auth: bool) -> Result<Value, ClientError> {
        self.request(path, Method::DELETE, None, auth).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        access: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| {
            tracing::error!(%method, path, error = %e, "Request failed");
            ClientError::Network(e)
        })
    }

    async fn finish(&self, response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        if !status.is_success() {
            let message = if is_json {
                response
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            } else {
                response.text().await.ok().filter(|t| !t.is_empty())
            }
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

            self.events.publish(ClientEvent::error(message.clone()));
            return Err(ClientError::Api { status, message });
        }

        if is_json {
            response
                .json()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()))
        } else {
            Ok(Value::Object(Default::default()))
        }
    }

    fn force_login(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "Failed to clear tokens");
        }
        self.events
            .publish(ClientEvent::Redirect(Route::Login(Some(LoginReason::Unauthorized))));
        self.events.publish(ClientEvent::error(REAUTH_MESSAGE));
    }

    // -----------------------------------------------------------------------
    // Refresh protocol
    // -----------------------------------------------------------------------

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Returns `false` without a network call when no refresh token is
    /// stored, and `false` without touching the store when the server
    /// refuses. Never retries.
    pub async fn refresh_tokens(&self) -> bool {
        let current = self.tokens.access_token();
        self.refresh_after(current.as_deref()).await
    }

    /// Refresh on behalf of a request that was sent with `stale` access token.
    async fn refresh_after(&self, stale: Option<&str>) -> bool {
        match self.policy {
            RefreshPolicy::Independent => self.exchange_refresh_token().await,
            RefreshPolicy::SingleFlight => {
                let _guard = self.refresh_lock.lock().await;
                let current = self.tokens.access_token();
                if current.is_some() && current.as_deref() != stale {
                    tracing::debug!("Token pair already refreshed by a concurrent caller");
                    return true;
                }
                self.exchange_refresh_token().await
            }
        }
    }

    async fn exchange_refresh_token(&self) -> bool {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            return false;
        };

        let response = match self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Refresh request failed");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Refresh refused");
            return false;
        }

        let pair = match response.json::<Envelope<TokenPair>>().await {
            Ok(Envelope { data: Some(pair), .. }) => pair,
            Ok(_) => {
                tracing::warn!("Refresh response carried no token pair");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh response was not decodable");
                return false;
            }
        };

        match self.tokens.set(&pair) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to store refreshed tokens");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Validate the form, log in, and store the issued pair.
    pub async fn login(&self, form: &LoginForm) -> Result<UserInfo, ClientError> {
        form.validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let body = json!({ "email": form.email, "password": form.password });
        let value = self.post(LOGIN_PATH, Some(&body), false).await?;
        let response: LoginResponse = data_of(value)?;

        self.tokens.set(&response.token_pair())?;
        tracing::info!(user_id = response.user.id, "Logged in");
        Ok(response.user)
    }

    /// Best-effort server logout, then clear local tokens and request the
    /// login surface with the unauthorized marker.
    ///
    /// A failed server call is logged and otherwise ignored.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(refresh_token) = self.tokens.refresh_token() {
            let body = json!({ "refreshToken": refresh_token });
            if let Err(e) = self.post(LOGOUT_PATH, Some(&body), false).await {
                tracing::debug!(error = %e, "Server logout failed; clearing locally");
            }
        }

        self.tokens.clear()?;
        self.events
            .publish(ClientEvent::Redirect(Route::Login(Some(LoginReason::Unauthorized))));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Task lists and tasks
    // -----------------------------------------------------------------------

    pub async fn task_lists(&self) -> Result<Vec<TaskList>, ClientError> {
        data_of(self.get("/api/task-lists", true).await?)
    }

    pub async fn create_task_list(&self, title: &str) -> Result<TaskList, ClientError> {
        let body = json!({ "title": title });
        data_of(self.post("/api/task-lists", Some(&body), true).await?)
    }

    pub async fn update_task_list(&self, id: DbId, title: &str) -> Result<TaskList, ClientError> {
        let body = json!({ "title": title });
        data_of(self.put(&format!("/api/task-lists/{id}"), Some(&body), true).await?)
    }

    pub async fn delete_task_list(&self, id: DbId) -> Result<(), ClientError> {
        self.delete(&format!("/api/task-lists/{id}"), true).await?;
        Ok(())
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        let body = to_body(task)?;
        data_of(self.post("/api/tasks", Some(&body), true).await?)
    }

    pub async fn update_task(&self, id: DbId, changes: &TaskChanges) -> Result<Task, ClientError> {
        let body = to_body(changes)?;
        data_of(self.put(&format!("/api/tasks/{id}"), Some(&body), true).await?)
    }

    pub async fn delete_task(&self, id: DbId) -> Result<(), ClientError> {
        self.delete(&format!("/api/tasks/{id}"), true).await?;
        Ok(())
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Pull `data` out of an envelope.
fn data_of<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    let envelope: Envelope<T> =
        serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))?;
    envelope
        .data
        .ok_or_else(|| ClientError::Decode("response envelope has no data".into()))
}
