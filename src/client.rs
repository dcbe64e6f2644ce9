//! HTTP client for the registration endpoint. A failed round-trip is reported as
//! [`Outcome::Transport`] so callers never confuse it with a server-side refusal.

use crate::{api::RegisterResponse, APP_USER_AGENT};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default request timeout applied to every submission.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid registration URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),
}

/// Values captured from the registration form.
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx with the server's confirmation message.
    Registered(String),
    /// The server answered with an error status and message.
    Rejected { status: u16, message: String },
    /// The request never produced a usable response.
    Transport(String),
}

impl Outcome {
    /// Text to show the user.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Registered(message) | Self::Rejected { message, .. } => message,
            Self::Transport(reason) => reason,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationClient {
    http: Client,
    endpoint: Url,
}

impl RegistrationClient {
    /// Build a client posting to `<base_url>/register`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let endpoint = Url::parse(&endpoint_url(base_url))?;
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit the form and classify the result.
    #[instrument(skip(self, form), fields(endpoint = %self.endpoint, username = %form.username))]
    pub async fn submit(&self, form: &RegistrationForm) -> Outcome {
        let body = json!({
            "username": form.username,
            "email": form.email,
            "password": form.password.expose_secret(),
        });

        let response = match self.http.post(self.endpoint.clone()).json(&body).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Registration request failed: {}", err);
                return Outcome::Transport(describe_transport_error(&err));
            }
        };

        let status = response.status();
        debug!("Registration response status: {}", status);

        match response.json::<RegisterResponse>().await {
            Ok(RegisterResponse { message }) if status.is_success() => Outcome::Registered(message),
            Ok(RegisterResponse { message }) => Outcome::Rejected {
                status: status.as_u16(),
                message,
            },
            Err(err) => {
                warn!("Failed to decode registration response: {}", err);
                Outcome::Transport(format!("Unexpected response from server ({status})"))
            }
        }
    }
}

fn endpoint_url(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    format!("{base}/register")
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Request timed out. Please try again.".to_string()
    } else {
        format!("Unable to reach the server: {err}")
    }
}
