//! HTTP client for the Zendesk ticket API.
//!
//! Covers the two endpoints the report needs: the paginated ticket search
//! and the single-ticket lookup used for subject resolution.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use zdr_core::config::Auth;
use zdr_core::types::{DateRange, Ticket};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach the API at {addr}\n  → check the subdomain and your network connection")]
    ConnectionFailed { addr: String },

    #[error("authentication rejected: check the credentials passed via flags or environment")]
    Unauthorized,

    #[error("rate limited by the API (HTTP 429); re-run the report later")]
    RateLimited,

    #[error("ticket {0} not found: the problem ticket may have been deleted")]
    TicketNotFound(u64),

    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            let addr = e
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            ClientError::ConnectionFailed { addr }
        } else {
            ClientError::Http {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// One page of search results.
#[derive(Debug, Deserialize)]
struct SearchPage {
    results: Vec<Ticket>,
    next_page: Option<String>,
    #[serde(default)]
    count: u64,
}

/// Single-ticket lookup response (`GET /api/v2/tickets/{id}.json`).
#[derive(Debug, Deserialize)]
struct ShowTicketResponse {
    ticket: TicketFields,
}

#[derive(Debug, Deserialize)]
struct TicketFields {
    #[serde(default)]
    subject: Option<String>,
}

/// Error body returned by the API. `error` may be a string or an object.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: serde_json::Value,
}

/// Client for the ticket API of one Zendesk instance.
pub struct ZendeskClient {
    base_url: String,
    auth: Auth,
    http: reqwest::Client,
}

impl ZendeskClient {
    /// Client for `https://{subdomain}.zendesk.com`.
    pub fn new(subdomain: &str, auth: Auth) -> Self {
        Self::with_base_url(&format!("https://{subdomain}.zendesk.com"), auth)
    }

    /// Client against an explicit base URL (used by tests).
    pub fn with_base_url(base_url: &str, auth: Auth) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http: reqwest::Client::new(),
        }
    }

    /// The API address (for error messages).
    pub fn addr(&self) -> &str {
        &self.base_url
    }

    /// Build a GET request with the configured auth scheme applied.
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.http.get(url).header("Content-Type", "application/json");
        match &self.auth {
            Auth::OauthToken(token) => req.bearer_auth(token),
            Auth::ApiToken { email, token } => {
                req.basic_auth(format!("{email}/token"), Some(token))
            }
            Auth::Basic { email, password } => req.basic_auth(email, Some(password)),
        }
    }

    /// Search query for incident tickets created inside `range`.
    fn search_query(range: &DateRange) -> String {
        format!(
            "type:ticket ticket_type:incident created>{} created<{}",
            range.start, range.end
        )
    }

    /// Fetch every incident ticket created inside `range`, ascending by
    /// creation time, following `next_page` links until the result set is
    /// exhausted.
    pub async fn search_incidents(&self, range: &DateRange) -> Result<Vec<Ticket>, ClientError> {
        let query = Self::search_query(range);
        let mut url = format!(
            "{}/api/v2/search.json?query={}&sort_by=created_at&sort_order=asc",
            self.base_url,
            urlencoding::encode(&query),
        );

        let mut tickets = Vec::new();
        loop {
            let response = self.request(&url).send().await?;
            if !response.status().is_success() {
                return Err(self.handle_error(response, None).await);
            }

            let page: SearchPage = response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
            debug!(results = page.results.len(), total = page.count, "fetched search page");
            tickets.extend(page.results);

            match page.next_page {
                Some(next) if !next.is_empty() => url = next,
                _ => break,
            }
        }

        Ok(tickets)
    }

    /// Look up a single ticket's subject. A ticket with no subject resolves
    /// to an empty string; a deleted ticket is `TicketNotFound`.
    pub async fn ticket_subject(&self, id: u64) -> Result<String, ClientError> {
        let url = format!("{}/api/v2/tickets/{}.json", self.base_url, id);
        let response = self.request(&url).send().await?;
        if !response.status().is_success() {
            return Err(self.handle_error(response, Some(id)).await);
        }

        let body: ShowTicketResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(body.ticket.subject.unwrap_or_default())
    }

    /// Map an error response from the API.
    async fn handle_error(
        &self,
        response: reqwest::Response,
        ticket_id: Option<u64>,
    ) -> ClientError {
        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return ClientError::Unauthorized;
        }

        if status == 429 {
            return ClientError::RateLimited;
        }

        if status == 404 {
            if let Some(id) = ticket_id {
                return ClientError::TicketNotFound(id);
            }
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error.to_string())
            .unwrap_or_else(|_| "unknown error".to_string());

        ClientError::Http { status, message }
    }
}
