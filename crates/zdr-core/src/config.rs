//! Credential resolution for the report job.
//!
//! CLI flags override environment variables of the same semantic name (the
//! merge happens in clap via `env` fallbacks, with a `.env` file loaded
//! before parsing). This module validates the merged profile and picks the
//! auth scheme to use against the API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing subdomain: pass -s/--subdomain or set SUBDOMAIN")]
    MissingSubdomain,

    #[error(
        "no complete auth scheme: provide an OAuth token (-o/OAUTHTOKEN), \
         an email plus API token (-u/-t), or an email plus password (-u/-p)"
    )]
    MissingAuth,
}

/// Merged authentication profile.
///
/// All fields are optional at this point; validation happens in
/// [`Credentials::subdomain`] and [`Credentials::auth`].
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub subdomain: Option<String>,
    pub oauth_token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub api_token: Option<String>,
}

/// Concrete auth scheme applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer {token}`.
    OauthToken(String),
    /// Basic auth with the `{email}/token` username convention.
    ApiToken { email: String, token: String },
    /// Basic auth with agent email and password.
    Basic { email: String, password: String },
}

impl Credentials {
    /// The validated subdomain. Required regardless of auth scheme.
    pub fn subdomain(&self) -> Result<&str, ConfigError> {
        self.subdomain
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSubdomain)
    }

    /// Pick the auth scheme, in precedence order: OAuth token, then
    /// email + API token, then email + password.
    pub fn auth(&self) -> Result<Auth, ConfigError> {
        if let Some(token) = non_empty(&self.oauth_token) {
            return Ok(Auth::OauthToken(token));
        }
        if let (Some(email), Some(token)) = (non_empty(&self.email), non_empty(&self.api_token)) {
            return Ok(Auth::ApiToken { email, token });
        }
        if let (Some(email), Some(password)) = (non_empty(&self.email), non_empty(&self.password)) {
            return Ok(Auth::Basic { email, password });
        }
        Err(ConfigError::MissingAuth)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
