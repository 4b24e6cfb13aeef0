//! REST client for the Shiprocket external API.
//!
//! Owns the bearer token. Every call returns either the decoded JSON body of
//! an HTTP 200 or a [`ShiprocketError`]; the envelope helpers ([`get`],
//! [`post`], [`patch`]) fold both into a [`ProviderResult`].
//!
//! [`get`]: ShiprocketApi::get
//! [`post`]: ShiprocketApi::post
//! [`patch`]: ShiprocketApi::patch

use serde::Serialize;
use serde_json::Value;
use shiprocket_core::ProviderResult;
use tokio::sync::{Mutex, RwLock};

use crate::config::ShiprocketConfig;
use crate::endpoints;
use crate::error::{extract_message, ShiprocketError};

/// Message attached to successful generic requests.
pub const SUCCESS_MESSAGE: &str = "Request Executed Successfully";

/// Message attached to a successful login.
pub const LOGIN_MESSAGE: &str = "Auth token fetched!";

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// HTTP client for one Shiprocket account.
pub struct ShiprocketApi {
    client: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
    /// Replaced wholesale on every successful login.
    token: RwLock<Option<String>>,
    /// Held while a lazy login runs so concurrent callers share it.
    login_lock: Mutex<()>,
}

impl ShiprocketApi {
    /// Create a client with its own connection pool and the configured
    /// request timeout.
    pub fn new(config: &ShiprocketConfig) -> Result<Self, ShiprocketError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ShiprocketConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            password: config.password.clone(),
            token: RwLock::new(None),
            login_lock: Mutex::new(()),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The cached bearer token, if a login has succeeded.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    // ---- authentication ----

    /// Exchange the credentials for a bearer token and cache it.
    ///
    /// On failure the previously cached token is left untouched.
    pub async fn login(&self) -> ProviderResult {
        match self.request_token().await {
            Ok((_, body)) => ProviderResult::success(body, LOGIN_MESSAGE),
            Err(e) => {
                tracing::warn!(error = %e, "Shiprocket login failed");
                ProviderResult::failure(format!("Unable to get auth-token: {e}"))
            }
        }
    }

    async fn request_token(&self) -> Result<(String, Value), ShiprocketError> {
        let response = self
            .client
            .post(self.url(endpoints::LOGIN))
            .json(&Credentials {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await?;
        let body = Self::read_body(response).await?;

        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ShiprocketError::UnexpectedResponse("login response carries no token".into())
            })?
            .to_string();

        self.set_token(Some(token.clone())).await;
        tracing::info!("Shiprocket login succeeded");
        Ok((token, body))
    }

    /// Cached token, or a fresh one when none is cached yet. Only one lazy
    /// login is in flight at a time.
    async fn bearer(&self) -> Result<String, ShiprocketError> {
        if let Some(token) = self.token().await {
            return Ok(token);
        }
        let _login = self.login_lock.lock().await;
        if let Some(token) = self.token().await {
            return Ok(token);
        }
        tracing::debug!("No Shiprocket token cached, logging in");
        self.request_token()
            .await
            .map(|(token, _)| token)
            .map_err(|e| ShiprocketError::Unauthenticated(e.to_string()))
    }

    // ---- raw requests ----

    pub async fn get_json(&self, path: &str) -> Result<Value, ShiprocketError> {
        let token = self.bearer().await?;
        tracing::debug!(path, "Shiprocket GET");
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_body(response).await
    }

    pub async fn get_query_json<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Value, ShiprocketError> {
        let token = self.bearer().await?;
        tracing::debug!(path, "Shiprocket GET");
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_body(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ShiprocketError> {
        let token = self.bearer().await?;
        tracing::debug!(path, "Shiprocket POST");
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::read_body(response).await
    }

    pub async fn patch_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ShiprocketError> {
        let token = self.bearer().await?;
        tracing::debug!(path, "Shiprocket PATCH");
        let response = self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::read_body(response).await
    }

    // ---- envelope requests ----

    pub async fn get(&self, path: &str) -> ProviderResult {
        Self::envelope(path, self.get_json(path).await)
    }

    pub async fn get_with_query<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> ProviderResult {
        Self::envelope(path, self.get_query_json(path, query).await)
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ProviderResult {
        Self::envelope(path, self.post_json(path, body).await)
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ProviderResult {
        Self::envelope(path, self.patch_json(path, body).await)
    }

    fn envelope(path: &str, result: Result<Value, ShiprocketError>) -> ProviderResult {
        match result {
            Ok(data) => ProviderResult::success(data, SUCCESS_MESSAGE),
            Err(e) => {
                tracing::warn!(path, error = %e, "Shiprocket request failed");
                ProviderResult::from_error(&e)
            }
        }
    }

    // ---- private helpers ----

    /// Decode the body and classify the status: 200 is success, 400/412 are
    /// business rejections, everything else is an API error.
    async fn read_body(response: reqwest::Response) -> Result<Value, ShiprocketError> {
        let status = response.status();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()))
        };

        match status.as_u16() {
            200 => Ok(body),
            code @ (400 | 412) => Err(ShiprocketError::Business {
                status: code,
                message: extract_message(&body)
                    .unwrap_or_else(|| format!("Request rejected with status {code}")),
            }),
            code => Err(ShiprocketError::Api {
                status: code,
                message: extract_message(&body)
                    .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
                    .or_else(|| status.canonical_reason().map(str::to_string))
                    .unwrap_or_else(|| "Unknown error".to_string()),
            }),
        }
    }
}
