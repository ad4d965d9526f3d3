//! Blocking client for the yd4b postal code / digital address API.
//!
//! # Design
//! Each endpoint is split three ways: a `build_*` method that produces an
//! `HttpRequest` without touching the network, a `parse_*` method that turns
//! an `HttpResponse` into a typed value, and a composed call that runs
//! `build`, [`Yd4bClient::send`] and `parse` in sequence. Callers doing their
//! own I/O can use the pure halves; everyone else uses the composed call.
//!
//! `send` is the single place where the standard headers are attached and the
//! configured `Transport` is invoked.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, DEFAULT_VERSION};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::request::{AddressZipRequest, SearchCodeRequest, TokenRequest};
use crate::types::{AddressZipResponse, SearchCodeResponse, TokenResponse};

/// Prefix some token responses carry in front of the actual token.
const TOKEN_PREFIX: &str = "Token: ";

/// Client for the yd4b API.
///
/// Construct it once, adjust it with the setters, then reuse it for every
/// call. Setters take `&mut self`, so configuration cannot change while a
/// call is in flight.
pub struct Yd4bClient {
    version: String,
    origin: String,
    client_id: String,
    client_secret: String,
    caller_ip: String,
    partner_id: Option<String>,
    token: Option<String>,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for Yd4bClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Yd4bClient")
            .field("version", &self.version)
            .field("origin", &self.origin)
            .field("client_id", &self.client_id)
            .field("caller_ip", &self.caller_ip)
            .field("partner_id", &self.partner_id)
            .field("has_token", &self.has_token())
            .finish_non_exhaustive()
    }
}

impl Yd4bClient {
    pub fn new(origin: &str, client_id: &str, client_secret: &str, caller_ip: &str) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            origin: origin.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            caller_ip: caller_ip.to_string(),
            partner_id: None,
            token: None,
            transport: Box::new(UreqTransport::new()),
        }
    }

    /// Build a client from loaded configuration. A configured timeout is
    /// applied to the default network transport.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut client = Self::new(
            &config.origin,
            &config.client_id,
            &config.client_secret,
            &config.caller_ip,
        );
        client.set_version(&config.version);
        if let Some(partner_id) = &config.partner_id {
            client.set_partner_id(partner_id);
        }
        if let Some(secs) = config.timeout_secs {
            client.set_transport(UreqTransport::with_timeout(Duration::from_secs(secs)));
        }
        client
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }

    /// Replace the transport, e.g. with a test double.
    pub fn set_transport(&mut self, transport: impl Transport + 'static) {
        self.transport = Box::new(transport);
    }

    /// Set the bearer token sent on every request. An empty token clears it.
    pub fn set_token(&mut self, token: &str) {
        self.token = (!token.is_empty()).then(|| token.to_string());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Set the partner id sent as `ec_uid`. An empty id clears it.
    pub fn set_partner_id(&mut self, partner_id: &str) {
        self.partner_id = (!partner_id.is_empty()).then(|| partner_id.to_string());
    }

    pub fn partner_id(&self) -> Option<&str> {
        self.partner_id.as_deref()
    }

    /// Attach the standard headers and dispatch `request` through the
    /// configured transport.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        request.set_header("Content-Type", "application/json");
        request.set_header("x-forwarded-for", self.caller_ip.as_str());
        if let Some(token) = &self.token {
            request.set_header("Authorization", format!("Bearer {token}"));
        }

        debug!(method = request.method.as_str(), url = %request.url, "sending yd4b request");
        let response = self.transport.send(request).map_err(|e| {
            warn!(error = %e, "yd4b transport failed");
            ApiError::transport(e)
        })?;
        debug!(status = response.status, "received yd4b response");
        Ok(response)
    }

    // -- address lookup ----------------------------------------------------

    pub fn build_address_zip(&self, input: &AddressZipRequest) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["addresszip"], &self.partner_query())?;
        let body = serde_json::to_string(input).map_err(ApiError::encode)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        })
    }

    pub fn parse_address_zip(&self, response: &HttpResponse) -> Result<AddressZipResponse, ApiError> {
        decode(response)
    }

    /// Look up zip codes matching the address parts in `input`.
    pub fn address_zip(&self, input: &AddressZipRequest) -> Result<AddressZipResponse, ApiError> {
        let request = self.build_address_zip(input)?;
        let response = self.send(request)?;
        self.parse_address_zip(&response)
    }

    // -- code search -------------------------------------------------------

    pub fn build_search_code(&self, input: &SearchCodeRequest) -> Result<HttpRequest, ApiError> {
        let mut query = self.partner_query();
        query.extend(input.query_pairs());
        let url = self.endpoint(&["searchcode", &input.code], &query)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn parse_search_code(&self, response: &HttpResponse) -> Result<SearchCodeResponse, ApiError> {
        decode(response)
    }

    /// Search by zip code, business zip code, or digital address code.
    pub fn search_code(&self, input: &SearchCodeRequest) -> Result<SearchCodeResponse, ApiError> {
        let request = self.build_search_code(input)?;
        let response = self.send(request)?;
        self.parse_search_code(&response)
    }

    // -- token exchange ----------------------------------------------------

    pub fn build_get_token(&self) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["j", "token"], &[])?;
        let input = TokenRequest::client_credentials(&self.client_id, &self.client_secret);
        let body = serde_json::to_string(&input).map_err(ApiError::encode)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        })
    }

    /// Decode a token response, dropping a leading `"Token: "` if present.
    pub fn parse_get_token(&self, response: &HttpResponse) -> Result<TokenResponse, ApiError> {
        let mut token: TokenResponse = decode(response)?;
        if let Some(stripped) = token.token.strip_prefix(TOKEN_PREFIX) {
            token.token = stripped.to_string();
        }
        Ok(token)
    }

    /// Exchange the client credentials for a bearer token.
    ///
    /// The token is returned, not installed; see [`Yd4bClient::authenticate`].
    pub fn get_token(&self) -> Result<TokenResponse, ApiError> {
        let request = self.build_get_token()?;
        let response = self.send(request)?;
        self.parse_get_token(&response)
    }

    /// Fetch a token and install it for subsequent calls.
    pub fn authenticate(&mut self) -> Result<TokenResponse, ApiError> {
        let token = self.get_token()?;
        self.set_token(&token.token);
        Ok(token)
    }

    /// `ec_uid` query parameter for endpoints that accept a partner id.
    fn partner_query(&self) -> Vec<(&'static str, String)> {
        self.partner_id
            .iter()
            .map(|id| ("ec_uid", id.clone()))
            .collect()
    }

    /// `origin/api/{version}/{segments..}?{query}`. A `/` inside `version`
    /// separates path segments.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.origin).map_err(ApiError::endpoint)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::endpoint(format!("origin `{}` cannot be a base URL", self.origin)))?
            .pop_if_empty()
            .push("api")
            .extend(self.version.split('/').filter(|part| !part.is_empty()))
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

/// Require a 200 status and decode the body as `T`.
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    if response.status != 200 {
        warn!(status = response.status, "unexpected yd4b status code");
        return Err(ApiError::unexpected_status(response.status));
    }
    serde_json::from_str(&response.body).map_err(|e| {
        warn!(error = %e, "failed to decode yd4b response");
        ApiError::decode(e)
    })
}
