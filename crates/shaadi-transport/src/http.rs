//! [`AuthApi`] over JSON/HTTP using `reqwest`.

use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use shaadi_protocol::{
    ApiErrorBody, AuthGrant, Codec, Credentials, Identity, IdentityResponse,
    JsonCodec, RegistrationProfile,
};

use crate::{ApiConfig, AuthApi, TransportError};

const JSON: &str = "application/json";

/// Talks to the real marketplace backend.
///
/// Cloning is cheap: `reqwest::Client` is an `Arc` around a connection
/// pool, so clones share connections.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    http: reqwest::Client,
    config: ApiConfig,
    me_url: Url,
    login_url: Url,
    register_url: Url,
    codec: JsonCodec,
}

impl HttpAuthApi {
    /// Builds a client for the given endpoints.
    ///
    /// # Errors
    /// [`TransportError::InvalidConfig`] if an endpoint URL can't be
    /// built from the config or the TLS backend can't be initialised.
    pub fn new(config: ApiConfig) -> Result<Self, TransportError> {
        let me_url = config.endpoint(&config.me_path)?;
        let login_url = config.endpoint(&config.login_path)?;
        let register_url = config.endpoint(&config.register_path)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;
        tracing::debug!(%me_url, %login_url, %register_url, "http auth api ready");
        Ok(Self {
            http,
            config,
            me_url,
            login_url,
            register_url,
            codec: JsonCodec,
        })
    }

    /// The endpoints this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Sends a prepared request and returns the body of a 2xx answer.
    async fn send(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, TransportError> {
        let response = request
            .header(ACCEPT, JSON)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!(endpoint, status, "backend refused request");
            return Err(classify_failure(endpoint, status, &body));
        }
        Ok(body.to_vec())
    }

    async fn post_grant<T: serde::Serialize>(
        &self,
        endpoint: &'static str,
        url: &Url,
        payload: &T,
    ) -> Result<AuthGrant, TransportError> {
        let bytes = self.codec.encode(payload)?;
        let request = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, JSON)
            .body(bytes);
        let body = self.send(endpoint, request).await?;
        let grant: AuthGrant = self.codec.decode(&body)?;
        grant.validate()?;
        Ok(grant)
    }
}

impl AuthApi for HttpAuthApi {
    async fn verify(&self, token: &str) -> Result<Identity, TransportError> {
        let request = self
            .http
            .get(self.me_url.clone())
            .bearer_auth(token);
        let body = self.send("verify", request).await?;
        let response: IdentityResponse = self.codec.decode(&body)?;
        Ok(response.into_identity())
    }

    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthGrant, TransportError> {
        self.post_grant("login", &self.login_url, credentials)
            .await
    }

    async fn register(
        &self,
        profile: &RegistrationProfile,
    ) -> Result<AuthGrant, TransportError> {
        self.post_grant("register", &self.register_url, profile)
            .await
    }
}

/// Turns a non-2xx answer into an error, pulling the reason out of the
/// body when the backend provided one.
fn classify_failure(
    endpoint: &str,
    status: u16,
    body: &[u8],
) -> TransportError {
    let reason = JsonCodec
        .decode::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.reason().map(str::to_owned))
        .unwrap_or_else(|| failure_message(endpoint, status));
    TransportError::from_status(status, reason)
}

fn failure_message(endpoint: &str, status: u16) -> String {
    format!("{endpoint} failed: {status}")
}
