//! Credentials for signing Cosmos DB requests.
//!
//! Shared-key mode signs each request locally. Workload-identity mode asks the
//! ambient identity provider for a bearer token and caches it until shortly
//! before expiry.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::{Url, form_urlencoded};
use zeroize::Zeroizing;

use crate::outbound::persistence::repository_config::{
    AmbientCredentialSource, FederatedTokenConfig, PartitionedAuth,
};

use super::signature::{self, SignedRequest};

const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// Errors raised while producing an authorization header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum CredentialError {
    #[error("account key rejected: {message}")]
    AccountKey { message: String },
    #[error("failed to read federated token file: {message}")]
    TokenFile { message: String },
    #[error("token request failed: {message}")]
    TokenRequest { message: String },
}

/// Signing strategy for one Cosmos account.
pub(crate) enum CosmosCredential {
    SharedKey(Zeroizing<Vec<u8>>),
    Ambient(AmbientTokenProvider),
}

impl CosmosCredential {
    pub(crate) fn from_auth(auth: PartitionedAuth, endpoint: &Url, http: reqwest::Client) -> Self {
        match auth {
            PartitionedAuth::SharedKey { account_key } => Self::SharedKey(account_key),
            PartitionedAuth::WorkloadIdentity(source) => {
                Self::Ambient(AmbientTokenProvider::new(http, source, endpoint))
            }
        }
    }

    /// Label used in startup logs.
    pub(crate) fn strategy(&self) -> &'static str {
        match self {
            Self::SharedKey(_) => "shared-key",
            Self::Ambient(provider) => provider.source_label(),
        }
    }

    pub(crate) async fn authorization(
        &self,
        request: &SignedRequest<'_>,
    ) -> Result<String, CredentialError> {
        match self {
            Self::SharedKey(account_key) => signature::master_key_authorization(account_key, request)
                .map_err(|err| CredentialError::AccountKey {
                    message: err.to_string(),
                }),
            Self::Ambient(provider) => {
                let token = provider.token().await?;
                Ok(signature::token_authorization(&token))
            }
        }
    }
}

impl fmt::Debug for CosmosCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy())
    }
}

struct CachedToken {
    token: Zeroizing<String>,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<ExpiresIn>,
}

/// The instance metadata service reports `expires_in` as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Option<u64> {
        match self {
            Self::Seconds(secs) => Some(*secs),
            Self::Text(text) => text.parse().ok(),
        }
    }
}

/// Fetches bearer tokens from the ambient identity provider.
pub(crate) struct AmbientTokenProvider {
    http: reqwest::Client,
    source: AmbientCredentialSource,
    resource: String,
    cache: Mutex<Option<CachedToken>>,
}

impl AmbientTokenProvider {
    pub(crate) fn new(
        http: reqwest::Client,
        source: AmbientCredentialSource,
        endpoint: &Url,
    ) -> Self {
        let resource = format!(
            "{}://{}",
            endpoint.scheme(),
            endpoint.host_str().unwrap_or_default()
        );
        Self {
            http,
            source,
            resource,
            cache: Mutex::new(None),
        }
    }

    fn source_label(&self) -> &'static str {
        match self.source {
            AmbientCredentialSource::FederatedToken(_) => "workload-identity-federated",
            AmbientCredentialSource::ManagedIdentity { .. } => "workload-identity-managed",
        }
    }

    async fn token(&self) -> Result<Zeroizing<String>, CredentialError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref().filter(|c| Instant::now() < c.refresh_at) {
            return Ok(cached.token.clone());
        }

        let response = self.request_token().await?;
        let lifetime = response
            .expires_in
            .as_ref()
            .and_then(ExpiresIn::seconds)
            .map_or(Duration::ZERO, Duration::from_secs);
        debug!(
            source = self.source_label(),
            lifetime_secs = lifetime.as_secs(),
            "acquired cosmos access token"
        );
        let token = Zeroizing::new(response.access_token);
        *cache = Some(CachedToken {
            token: token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        });
        Ok(token)
    }

    async fn request_token(&self) -> Result<TokenResponse, CredentialError> {
        let request = match &self.source {
            AmbientCredentialSource::FederatedToken(config) => {
                self.federated_request(config).await?
            }
            AmbientCredentialSource::ManagedIdentity { client_id } => {
                self.managed_identity_request(client_id.as_deref())
            }
        };

        let response = request.send().await.map_err(token_request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CredentialError::TokenRequest {
                message: format!("identity provider returned {status}"),
            });
        }
        response.json().await.map_err(token_request_error)
    }

    async fn federated_request(
        &self,
        config: &FederatedTokenConfig,
    ) -> Result<reqwest::RequestBuilder, CredentialError> {
        let assertion = tokio::fs::read_to_string(&config.token_file)
            .await
            .map_err(|err| CredentialError::TokenFile {
                message: format!("{}: {err}", config.token_file.display()),
            })?;
        let url = config
            .authority_host
            .join(&format!("{}/oauth2/v2.0/token", config.tenant_id))
            .map_err(|err| CredentialError::TokenRequest {
                message: err.to_string(),
            })?;
        let scope = format!("{}/.default", self.resource);
        let body: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &config.client_id)
            .append_pair("scope", &scope)
            .append_pair("client_assertion_type", CLIENT_ASSERTION_TYPE)
            .append_pair("client_assertion", assertion.trim())
            .append_pair("grant_type", "client_credentials")
            .finish();

        Ok(self
            .http
            .request(Method::POST, url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body))
    }

    fn managed_identity_request(&self, client_id: Option<&str>) -> reqwest::RequestBuilder {
        let mut query = vec![
            ("api-version", IMDS_API_VERSION),
            ("resource", self.resource.as_str()),
        ];
        if let Some(client_id) = client_id {
            query.push(("client_id", client_id));
        }
        self.http
            .request(Method::GET, IMDS_TOKEN_ENDPOINT)
            .query(&query)
            .header("Metadata", "true")
    }
}

fn token_request_error(err: reqwest::Error) -> CredentialError {
    CredentialError::TokenRequest {
        message: err.without_url().to_string(),
    }
}
