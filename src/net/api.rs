//! REST API client for the Shhava backend.
//!
//! ERROR HANDLING
//! ==============
//! The backend reports failures three ways: a transport error, a non-2xx
//! status, or a 2xx body with `success: false`. All three surface as
//! [`ApiError`] so callers handle a single failure path. When a failing body
//! carries a `message`, it is preserved for display.

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::net::types::{
    AuthResponse, FateFlashback, FlashbacksResponse, MomentsResponse, NewSerendipityMoment,
    SerendipityMoment, User,
};

/// HTTP client bound to one backend base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying TLS/HTTP stack fails to initialize.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base_url: config.base_url().to_owned() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// Exchange an identity-provider authorization code for a bearer token
    /// and the user record via `POST /auth/google`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, a rejected
    /// exchange (`success: false`), or a success payload missing the token
    /// or user.
    pub async fn exchange_code(&self, code: &str) -> Result<(String, User), ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/google"))
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await?;
        let body = auth_envelope(resp).await?;
        match (body.token, body.user) {
            (Some(token), Some(user)) => Ok((token, user)),
            _ => Err(ApiError::Malformed),
        }
    }

    /// Invalidate the session server-side via `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn notify_logout(&self, token: &str) -> Result<(), ApiError> {
        let resp = self.http.post(self.url("/auth/logout")).bearer_auth(token).send().await?;
        expect_success(&resp)
    }

    /// Resolve the current user for a stored token via `GET /me`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is no longer accepted or the payload
    /// has no user.
    pub async fn fetch_current_user(&self, token: &str) -> Result<User, ApiError> {
        let resp = self.http.get(self.url("/me")).bearer_auth(token).send().await?;
        let body = auth_envelope(resp).await?;
        body.user.ok_or(ApiError::Malformed)
    }

    // =========================================================================
    // SERENDIPITY MOMENTS
    // =========================================================================

    /// List the user's serendipity moments.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or a payload
    /// that does not decode.
    pub async fn list_moments(&self, token: &str) -> Result<Vec<SerendipityMoment>, ApiError> {
        let resp =
            self.http.get(self.url("/serendipity-moments")).bearer_auth(token).send().await?;
        let body: MomentsResponse = decode_success(resp).await?;
        Ok(body.moments)
    }

    /// Record a new serendipity moment.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn create_moment(
        &self,
        token: &str,
        moment: &NewSerendipityMoment,
    ) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/serendipity-moments"))
            .bearer_auth(token)
            .json(moment)
            .send()
            .await?;
        expect_success(&resp)
    }

    // =========================================================================
    // FATE FLASHBACKS
    // =========================================================================

    /// List the user's fate flashback story cards.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or a payload
    /// that does not decode.
    pub async fn list_flashbacks(&self, token: &str) -> Result<Vec<FateFlashback>, ApiError> {
        let resp = self.http.get(self.url("/flashbacks")).bearer_auth(token).send().await?;
        let body: FlashbacksResponse = decode_success(resp).await?;
        Ok(body.flashbacks)
    }

    /// Mark a flashback as viewed via `POST /flashbacks/{id}/view`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn mark_flashback_viewed(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/flashbacks/{id}/view")))
            .bearer_auth(token)
            .send()
            .await?;
        expect_success(&resp)
    }

    /// Mark a flashback as shared via `POST /flashbacks/{id}/share`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    pub async fn share_flashback(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/flashbacks/{id}/share")))
            .bearer_auth(token)
            .send()
            .await?;
        expect_success(&resp)
    }
}

/// Decode an `AuthResponse` envelope, folding HTTP status and the `success`
/// flag into one result. A failing body's `message` wins over the bare
/// status code.
async fn auth_envelope(resp: reqwest::Response) -> Result<AuthResponse, ApiError> {
    let status = resp.status();
    let body: AuthResponse = match resp.json().await {
        Ok(body) => body,
        Err(_) if !status.is_success() => return Err(ApiError::Status(status.as_u16())),
        Err(_) => return Err(ApiError::Malformed),
    };

    if status.is_success() && body.success {
        return Ok(body);
    }
    match body.message {
        Some(message) if !message.is_empty() => Err(ApiError::Rejected(message)),
        _ if !status.is_success() => Err(ApiError::Status(status.as_u16())),
        _ => Err(ApiError::Rejected("request rejected by server".to_owned())),
    }
}

/// Decode a plain JSON payload from a response that must be 2xx.
async fn decode_success<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }
    resp.json().await.map_err(|_| ApiError::Malformed)
}

fn expect_success(resp: &reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    if status.is_success() { Ok(()) } else { Err(ApiError::Status(status.as_u16())) }
}
