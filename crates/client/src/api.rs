//! REST API client for the enhancement service.
//!
//! Wraps the history, detail, submission and auth endpoints. Calls that
//! require a session attach the stored bearer token; a `401` triggers a
//! single token refresh followed by one retry.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use enhancer_core::filter::{validate_page, validate_per_page, PAGE_SIZE};
use enhancer_core::job::JobKind;
use enhancer_core::models::validate_model;
use enhancer_core::status::JobStatus;
use enhancer_core::wire::{
    ErrorBody, ImageDetailResponse, ImageEnhanceRequest, ImageEnhanceResponse, ImageListResponse,
    LoginRequest, LoginResponse, MeResponse, MessageResponse, RefreshRequest, RefreshResponse,
    RegisterRequest, RegisterResponse, User, VideoDetailResponse, VideoEnhanceRequest,
    VideoEnhanceResponse, VideoListResponse,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::config::ClientConfig;
use crate::error::EnhanceApiError;

const AUTH_LOGIN: &str = "/api/auth/login";
const AUTH_REGISTER: &str = "/api/auth/register";
const AUTH_REFRESH: &str = "/api/auth/refresh";
const AUTH_LOGOUT: &str = "/api/auth/logout";
const AUTH_ME: &str = "/api/auth/me";
const IMAGES: &str = "/api/images";
const IMAGES_ENHANCE: &str = "/api/images/enhance";
const VIDEOS: &str = "/api/videos";
const VIDEOS_ENHANCE: &str = "/api/videos/enhance";
const HEALTH: &str = "/api/health";

/// Bearer credentials held by an [`EnhanceApi`].
#[derive(Debug, Clone)]
struct Session {
    access_token: String,
    refresh_token: Option<String>,
}

/// HTTP client for one enhancement service.
pub struct EnhanceApi {
    client: reqwest::Client,
    api_url: String,
    session: RwLock<Option<Session>>,
}

/// Pagination and status filter for the list endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub status: Option<JobStatus>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PAGE_SIZE,
            status: None,
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            status: None,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Query-string pairs for a list call against `kind`.
    fn params(&self, kind: JobKind) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(status) = &self.status {
            params.push(("status", status.wire_value(kind).to_string()));
        }
        params
    }
}

/// A local file to submit for enhancement.
#[derive(Debug, Clone)]
pub struct Submission {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub model_type: String,
    pub scale: Option<u32>,
    pub face_enhance: bool,
    pub description: Option<String>,
}

impl EnhanceApi {
    /// Create a new API client for an enhancement service.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8888`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        }
    }

    /// Build a client from configuration, including any pre-issued tokens.
    pub fn from_config(config: &ClientConfig) -> Result<Self, EnhanceApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let session = config.access_token.clone().map(|access_token| Session {
            access_token,
            refresh_token: config.refresh_token.clone(),
        });

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            session: RwLock::new(session),
        })
    }

    /// Base HTTP URL of the service.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Install tokens obtained elsewhere.
    pub async fn set_tokens(&self, access_token: String, refresh_token: Option<String>) {
        *self.session.write().await = Some(Session {
            access_token,
            refresh_token,
        });
    }

    /// Forget the current session.
    pub async fn clear_tokens(&self) {
        *self.session.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    // ---- auth ----

    /// Log in with email and password and keep the issued tokens.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, EnhanceApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(self.url(AUTH_LOGIN)).json(&body).send().await?;
        let login: LoginResponse = Self::parse_response(response).await?;

        self.set_tokens(
            login.tokens.access_token.clone(),
            Some(login.tokens.refresh_token.clone()),
        )
        .await;
        tracing::info!(email = %email, "Logged in to enhancement service");

        Ok(login)
    }

    /// Create an account. Does not log in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, EnhanceApiError> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(self.url(AUTH_REGISTER)).json(&body).send().await?;
        Self::parse_response(response).await
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh(&self) -> Result<(), EnhanceApiError> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or_else(|| EnhanceApiError::Unauthorized("no refresh token available".into()))?;

        let response = self
            .client
            .post(self.url(AUTH_REFRESH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        let refreshed: RefreshResponse = Self::parse_response(response).await?;

        if let Some(session) = self.session.write().await.as_mut() {
            session.access_token = refreshed.access_token;
        }
        tracing::debug!("Access token refreshed");
        Ok(())
    }

    /// Revoke the refresh token on the server. The local session is
    /// cleared even when the call fails.
    pub async fn logout(&self) -> Result<(), EnhanceApiError> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone());

        let result = match refresh_token {
            Some(refresh_token) => {
                let request = self
                    .authorize(self.client.post(self.url(AUTH_LOGOUT)))
                    .await
                    .json(&RefreshRequest { refresh_token });
                match request.send().await {
                    Ok(response) => Self::check_status(response).await,
                    Err(e) => Err(e.into()),
                }
            }
            None => Ok(()),
        };

        self.clear_tokens().await;
        result
    }

    /// The user owning the current session.
    pub async fn me(&self) -> Result<User, EnhanceApiError> {
        let response = self.send_authorized(|| self.client.get(self.url(AUTH_ME))).await?;
        let me: MeResponse = Self::parse_response(response).await?;
        Ok(me.user)
    }

    /// Service health document.
    pub async fn health(&self) -> Result<serde_json::Value, EnhanceApiError> {
        let response = self.client.get(self.url(HEALTH)).send().await?;
        Self::parse_response(response).await
    }

    // ---- history ----

    /// `GET /api/images?page&per_page[&status]`.
    pub async fn list_images(&self, query: &ListQuery) -> Result<ImageListResponse, EnhanceApiError> {
        self.fetch_list(IMAGES, JobKind::Image, query).await
    }

    /// `GET /api/videos?page&per_page[&status]`.
    pub async fn list_videos(&self, query: &ListQuery) -> Result<VideoListResponse, EnhanceApiError> {
        self.fetch_list(VIDEOS, JobKind::Video, query).await
    }

    /// `GET /api/images/{id}` including both payloads.
    pub async fn image_detail(&self, id: &str) -> Result<ImageDetailResponse, EnhanceApiError> {
        let url = format!("{}/{id}", self.url(IMAGES));
        let response = self.send_authorized(|| self.client.get(&url)).await?;
        Self::parse_response(response).await
    }

    /// `GET /api/videos/{id}` including both payloads.
    pub async fn video_detail(&self, id: &str) -> Result<VideoDetailResponse, EnhanceApiError> {
        let url = format!("{}/{id}", self.url(VIDEOS));
        let response = self.send_authorized(|| self.client.get(&url)).await?;
        Self::parse_response(response).await
    }

    pub async fn delete_image(&self, id: &str) -> Result<MessageResponse, EnhanceApiError> {
        let url = format!("{}/{id}", self.url(IMAGES));
        let response = self.send_authorized(|| self.client.delete(&url)).await?;
        Self::parse_response(response).await
    }

    pub async fn delete_video(&self, id: &str) -> Result<MessageResponse, EnhanceApiError> {
        let url = format!("{}/{id}", self.url(VIDEOS));
        let response = self.send_authorized(|| self.client.delete(&url)).await?;
        Self::parse_response(response).await
    }

    // ---- submission ----

    /// Submit an image. Processing is synchronous on the service side,
    /// so the response already carries the finished job.
    pub async fn enhance_image(
        &self,
        submission: &Submission,
    ) -> Result<ImageEnhanceResponse, EnhanceApiError> {
        validate_model(&submission.model_type)?;
        let body = ImageEnhanceRequest {
            image_base64: STANDARD.encode(&submission.bytes),
            filename: submission.filename.clone(),
            description: submission.description.clone(),
            model_type: submission.model_type.clone(),
            scale: submission.scale,
            face_enhance: submission.face_enhance,
            output_width: None,
            output_height: None,
        };

        tracing::info!(
            filename = %submission.filename,
            model_type = %submission.model_type,
            size_bytes = submission.bytes.len(),
            "Submitting image for enhancement",
        );
        let response = self
            .send_authorized(|| self.client.post(self.url(IMAGES_ENHANCE)).json(&body))
            .await?;
        Self::parse_response(response).await
    }

    /// Submit a video. The returned job is usually still pending; track
    /// it through the list endpoints.
    pub async fn enhance_video(
        &self,
        submission: &Submission,
    ) -> Result<VideoEnhanceResponse, EnhanceApiError> {
        validate_model(&submission.model_type)?;
        let body = VideoEnhanceRequest {
            video_base64: STANDARD.encode(&submission.bytes),
            filename: submission.filename.clone(),
            description: submission.description.clone(),
            model_type: submission.model_type.clone(),
            scale: submission.scale,
            face_enhance: submission.face_enhance,
        };

        tracing::info!(
            filename = %submission.filename,
            model_type = %submission.model_type,
            size_bytes = submission.bytes.len(),
            "Submitting video for enhancement",
        );
        let response = self
            .send_authorized(|| self.client.post(self.url(VIDEOS_ENHANCE)).json(&body))
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        kind: JobKind,
        query: &ListQuery,
    ) -> Result<T, EnhanceApiError> {
        validate_page(query.page)?;
        validate_per_page(query.per_page)?;

        let url = self.url(path);
        let params = query.params(kind);
        let response = self
            .send_authorized(|| self.client.get(&url).query(&params))
            .await?;
        Self::parse_response(response).await
    }

    /// Attach the bearer token, if a session exists.
    async fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.read().await.as_ref() {
            Some(session) => request.bearer_auth(&session.access_token),
            None => request,
        }
    }

    async fn has_refresh_token(&self) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.refresh_token.is_some())
    }

    /// Send an authorized request, refreshing the session once on `401`.
    ///
    /// `build` is invoked again for the retry because a sent
    /// [`reqwest::RequestBuilder`] cannot be reused.
    async fn send_authorized<F>(&self, build: F) -> Result<reqwest::Response, EnhanceApiError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let response = self.authorize(build()).await.send().await?;
        if response.status() != StatusCode::UNAUTHORIZED || !self.has_refresh_token().await {
            return Ok(response);
        }

        tracing::debug!("Access token rejected, refreshing session");
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Session refresh failed, clearing tokens");
            self.clear_tokens().await;
            return Err(EnhanceApiError::Unauthorized(
                "session expired and could not be refreshed".into(),
            ));
        }

        Ok(self.authorize(build()).await.send().await?)
    }

    /// Ensure the response has a success status code. Non-2xx responses
    /// become [`EnhanceApiError::Api`] (or `Unauthorized` for `401`)
    /// carrying the service's error message.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, EnhanceApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);

        if status == StatusCode::UNAUTHORIZED {
            return Err(EnhanceApiError::Unauthorized(message));
        }
        Err(EnhanceApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, EnhanceApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), EnhanceApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
