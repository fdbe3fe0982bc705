//! HTTP client for the remote forum service. Centralizes endpoint
//! construction, bearer-credential attachment, and the mapping of HTTP
//! statuses onto crate error kinds so callers never inspect raw responses.
//! Passwords and tokens are exposed only at the request boundary and are
//! never logged.

pub mod types;

use crate::error::{Error, Result};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info_span, Instrument};
use types::{
    AccountUser, LoginResponse, MessageResponse, RegisterResponse, Role, RoleChangeResponse, User,
};
use url::Url;

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ForumApi {
    base_url: String,
    client: Client,
}

impl ForumApi {
    /// Builds a client for the given API base URL, e.g.
    /// `http://localhost:8080/api`.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot be parsed or does not use
    /// http/https.
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|err| Error::Config(format!("invalid API base URL: {err}")))?;

        let scheme = url.scheme();
        if !matches!(scheme, "http" | "https") {
            return Err(Error::Config(format!(
                "invalid API base URL: unsupported scheme {scheme}"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("forumo/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: trimmed.to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Exchanges an email/password pair for a bearer token and account record.
    ///
    /// # Errors
    /// `InvalidCredentials` on 401, `EmailUnverified` on 403, `Transport` on
    /// network failure.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse> {
        let url = self.endpoint("/auth/login");
        let payload = json!({
            "email": email,
            "password": password.expose_secret()
        });

        let span = info_span!("forum.login", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => decode(response).await,
            401 => Err(Error::InvalidCredentials),
            403 => Err(Error::EmailUnverified),
            _ => Err(unexpected(status, response).await),
        }
    }

    /// Registers a new account. The response may carry a verification token
    /// when the server runs without a mail relay.
    ///
    /// # Errors
    /// `DuplicateRegistration` when the address is already taken.
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<RegisterResponse> {
        let url = self.endpoint("/auth/register");
        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
            "name": name
        });

        let span = info_span!("forum.register", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => decode(response).await,
            400 | 409 => Err(Error::DuplicateRegistration),
            _ => Err(unexpected(status, response).await),
        }
    }

    /// Confirms an email address with the token from the verification mail.
    ///
    /// # Errors
    /// `InvalidVerification` when the token is unknown or expired.
    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse> {
        let url = self.endpoint("/auth/verify");
        let payload = json!({ "token": token });

        let span = info_span!("forum.verify_email", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => decode(response).await,
            400 | 404 | 410 => Err(Error::InvalidVerification),
            _ => Err(unexpected(status, response).await),
        }
    }

    /// Asks the remote authority whether the token is still accepted.
    /// `Ok(true)` means accepted, `Ok(false)` means explicitly rejected.
    /// Any other outcome, including a 5xx from a struggling server, is an
    /// error so the caller can treat it as inconclusive.
    pub async fn validate_token(&self, token: &SecretString) -> Result<bool> {
        let url = self.endpoint("/auth/validate");

        let span = info_span!("forum.validate", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => Ok(true),
            401 | 403 => Ok(false),
            _ => Err(unexpected(status, response).await),
        }
    }

    /// Fetches the signed-in account record, used to re-derive the identity
    /// when resuming a stored session.
    ///
    /// # Errors
    /// `SessionExpired` when the credential is no longer accepted.
    pub async fn me(&self, token: &SecretString) -> Result<AccountUser> {
        let url = self.endpoint("/users/me");

        let span = info_span!("forum.me", http.method = "GET", url = %url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => decode(response).await,
            401 | 403 => Err(Error::SessionExpired),
            _ => Err(unexpected(status, response).await),
        }
    }

    /// Lists all roles.
    pub async fn roles(&self, token: &SecretString) -> Result<Vec<Role>> {
        let url = self.endpoint("/roles");

        let span = info_span!("forum.roles", http.method = "GET", url = %url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await?;

        authorized(response).await
    }

    /// Lists the user roster. Admin only, enforced by the server.
    pub async fn users(&self, token: &SecretString) -> Result<Vec<User>> {
        let url = self.endpoint("/users");

        let span = info_span!("forum.users", http.method = "GET", url = %url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await?;

        authorized(response).await
    }

    /// Assigns a role to a user and returns the server's updated record.
    pub async fn update_user_role(
        &self,
        token: &SecretString,
        user_id: u64,
        role_id: u64,
    ) -> Result<RoleChangeResponse> {
        let url = self.endpoint(&format!("/users/{user_id}/role"));
        let payload = json!({ "roleId": role_id });

        let span = info_span!("forum.update_user_role", http.method = "PATCH", url = %url);
        let response = self
            .client
            .patch(&url)
            .json(&payload)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await?;

        authorized(response).await
    }
}

/// Shared status mapping for bearer-authenticated calls.
async fn authorized<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    match status.as_u16() {
        200..=299 => decode(response).await,
        401 => Err(Error::SessionExpired),
        403 => Err(Error::Forbidden),
        _ => Err(unexpected(status, response).await),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| Error::Decode(format!("failed to decode response: {err}")))
}

async fn unexpected(status: StatusCode, response: Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    Error::Unexpected {
        status: status.as_u16(),
        message: error_message(&body),
    }
}

/// Pulls the server's `{"error": "..."}` message out of a failure body,
/// falling back to the trimmed body itself.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(String::from));

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        "request failed".to_string()
    } else {
        message.chars().take(MAX_ERROR_CHARS).collect()
    }
}
