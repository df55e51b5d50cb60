//! Typed order-store configuration resolved from raw settings.
//!
//! Resolution is pure: it validates which settings the selected backend
//! needs and returns [`ConfigError`] before any connection is attempted.
//! The startup path decides that such an error is fatal.

use std::fmt;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use url::Url;
use zeroize::Zeroizing;

use crate::settings::{AmbientIdentitySettings, DatabaseSettings};

use super::cosmos::PartitionKey;

/// Selector value choosing the Cosmos DB SQL API backend.
pub const COSMOS_SQL_API: &str = "cosmosdbsql";

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com/";

/// Errors raised while resolving store configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A setting required by the selected backend is absent or empty.
    #[error("{name} is not set")]
    MissingSetting { name: &'static str },
    /// A setting is present but unusable.
    #[error("{name} is invalid: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name,
            reason: reason.into(),
        }
    }
}

/// Storage API family selected by `ORDER_DB_API`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseApi {
    /// Partitioned Cosmos DB SQL API.
    CosmosSql,
    /// Document store speaking the MongoDB API. Default for any other value.
    MongoDb,
}

impl DatabaseApi {
    /// Map the raw selector; anything but [`COSMOS_SQL_API`] is MongoDB.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            Some(COSMOS_SQL_API) => Self::CosmosSql,
            _ => Self::MongoDb,
        }
    }
}

/// Connection settings for the document store.
#[derive(Clone)]
pub struct DocumentStoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub credential: Option<DocumentStoreCredential>,
}

/// Username/password pair applied on top of the connection URI.
#[derive(Clone)]
pub struct DocumentStoreCredential {
    pub username: String,
    pub password: Option<Zeroizing<String>>,
}

/// Connection settings for the partitioned store.
#[derive(Clone)]
pub struct PartitionedStoreConfig {
    pub endpoint: Url,
    pub database: String,
    pub container: String,
    pub partition_key: PartitionKey,
    pub auth: PartitionedAuth,
}

/// Authentication strategy for the partitioned store.
#[derive(Clone)]
pub enum PartitionedAuth {
    /// Pre-shared account key, already decoded from base64.
    SharedKey { account_key: Zeroizing<Vec<u8>> },
    /// Token from the ambient identity provider; no secret configured.
    WorkloadIdentity(AmbientCredentialSource),
}

/// Where ambient tokens come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmbientCredentialSource {
    /// Federated token exchange with a projected service-account token.
    FederatedToken(FederatedTokenConfig),
    /// Instance metadata endpoint, optionally for a user-assigned identity.
    ManagedIdentity { client_id: Option<String> },
}

/// Inputs for the federated token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedTokenConfig {
    pub client_id: String,
    pub tenant_id: String,
    pub token_file: PathBuf,
    pub authority_host: Url,
}

/// Fully validated configuration for exactly one backend.
#[derive(Debug, Clone)]
pub enum RepositoryConfig {
    /// MongoDB API document store.
    Document(DocumentStoreConfig),
    /// Cosmos DB SQL API partitioned store.
    Partitioned(PartitionedStoreConfig),
}

impl RepositoryConfig {
    /// Validate raw settings for the backend chosen by `ORDER_DB_API`.
    ///
    /// # Examples
    /// ```
    /// use order_service::outbound::persistence::{ConfigError, RepositoryConfig};
    /// use order_service::settings::DatabaseSettings;
    ///
    /// let settings = DatabaseSettings {
    ///     api: Some("cosmosdbsql".to_owned()),
    ///     uri: Some("https://acct.documents.azure.com:443/".to_owned()),
    ///     name: Some("orderdb".to_owned()),
    ///     container_name: Some("orders".to_owned()),
    ///     ..DatabaseSettings::default()
    /// };
    /// let err = RepositoryConfig::resolve(&settings).unwrap_err();
    /// assert_eq!(err, ConfigError::MissingSetting { name: "ORDER_DB_PARTITION_KEY" });
    /// ```
    pub fn resolve(settings: &DatabaseSettings) -> Result<Self, ConfigError> {
        let api = DatabaseApi::from_selector(non_empty(&settings.api));
        let uri = non_empty(&settings.cosmos_resource_endpoint)
            .or_else(|| non_empty(&settings.uri))
            .ok_or(ConfigError::MissingSetting {
                name: "ORDER_DB_URI",
            })?;
        let database = required(&settings.name, "ORDER_DB_NAME")?;

        match api {
            DatabaseApi::CosmosSql => {
                Self::resolve_partitioned(settings, uri, database).map(Self::Partitioned)
            }
            DatabaseApi::MongoDb => {
                Self::resolve_document(settings, uri, database).map(Self::Document)
            }
        }
    }

    /// Backend family this configuration targets.
    pub fn api(&self) -> DatabaseApi {
        match self {
            Self::Document(_) => DatabaseApi::MongoDb,
            Self::Partitioned(_) => DatabaseApi::CosmosSql,
        }
    }

    fn resolve_partitioned(
        settings: &DatabaseSettings,
        uri: &str,
        database: String,
    ) -> Result<PartitionedStoreConfig, ConfigError> {
        let container = required(&settings.container_name, "ORDER_DB_CONTAINER_NAME")?;
        let key_name = required(&settings.partition_key, "ORDER_DB_PARTITION_KEY")?;
        let key_value = required(&settings.partition_value, "ORDER_DB_PARTITION_VALUE")?;
        let partition_key = PartitionKey::new(key_name, key_value)
            .map_err(|err| ConfigError::invalid("ORDER_DB_PARTITION_KEY", err.to_string()))?;

        let endpoint = parse_http_url(uri, "ORDER_DB_URI")?;
        let auth = if parse_flag(
            non_empty(&settings.use_workload_identity_auth),
            "USE_WORKLOAD_IDENTITY_AUTH",
        )? {
            PartitionedAuth::WorkloadIdentity(resolve_ambient_source(&settings.identity)?)
        } else {
            let encoded = required(&settings.password, "ORDER_DB_PASSWORD")?;
            let account_key = STANDARD.decode(encoded.as_bytes()).map_err(|_| {
                ConfigError::invalid("ORDER_DB_PASSWORD", "account key is not valid base64")
            })?;
            PartitionedAuth::SharedKey {
                account_key: Zeroizing::new(account_key),
            }
        };

        Ok(PartitionedStoreConfig {
            endpoint,
            database,
            container,
            partition_key,
            auth,
        })
    }

    fn resolve_document(
        settings: &DatabaseSettings,
        uri: &str,
        database: String,
    ) -> Result<DocumentStoreConfig, ConfigError> {
        let collection = required(&settings.collection_name, "ORDER_DB_COLLECTION_NAME")?;
        let password = non_empty(&settings.password).map(|p| Zeroizing::new(p.to_owned()));
        let credential = match (non_empty(&settings.username), password) {
            (Some(username), password) => Some(DocumentStoreCredential {
                username: username.to_owned(),
                password,
            }),
            (None, Some(_)) => {
                return Err(ConfigError::invalid(
                    "ORDER_DB_PASSWORD",
                    "a password requires ORDER_DB_USERNAME",
                ));
            }
            (None, None) => None,
        };

        Ok(DocumentStoreConfig {
            uri: uri.to_owned(),
            database,
            collection,
            credential,
        })
    }
}

fn resolve_ambient_source(
    identity: &AmbientIdentitySettings,
) -> Result<AmbientCredentialSource, ConfigError> {
    let client_id = non_empty(&identity.azure_client_id);
    let Some(token_file) = non_empty(&identity.azure_federated_token_file) else {
        return Ok(AmbientCredentialSource::ManagedIdentity {
            client_id: client_id.map(str::to_owned),
        });
    };

    let client_id = client_id.ok_or(ConfigError::MissingSetting {
        name: "AZURE_CLIENT_ID",
    })?;
    let tenant_id = required(&identity.azure_tenant_id, "AZURE_TENANT_ID")?;
    let authority_host = parse_http_url(
        non_empty(&identity.azure_authority_host).unwrap_or(DEFAULT_AUTHORITY_HOST),
        "AZURE_AUTHORITY_HOST",
    )?;

    Ok(AmbientCredentialSource::FederatedToken(FederatedTokenConfig {
        client_id: client_id.to_owned(),
        tenant_id,
        token_file: PathBuf::from(token_file),
        authority_host,
    }))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    non_empty(value)
        .map(str::to_owned)
        .ok_or(ConfigError::MissingSetting { name })
}

fn parse_flag(value: Option<&str>, name: &'static str) -> Result<bool, ConfigError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(ConfigError::invalid(
            name,
            format!("expected true or false, got {other:?}"),
        )),
    }
}

fn parse_http_url(raw: &str, name: &'static str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::invalid(name, err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::invalid(
            name,
            format!("unsupported scheme {scheme:?}"),
        )),
    }
}

impl fmt::Debug for DocumentStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStoreConfig")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field(
                "username",
                &self.credential.as_ref().map(|c| c.username.as_str()),
            )
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for DocumentStoreCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStoreCredential")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for PartitionedStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionedStoreConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("database", &self.database)
            .field("container", &self.container)
            .field("partition_key", &self.partition_key)
            .field("auth", &self.auth)
            .finish()
    }
}

impl fmt::Debug for PartitionedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedKey { .. } => f.write_str("SharedKey(<redacted>)"),
            Self::WorkloadIdentity(source) => {
                f.debug_tuple("WorkloadIdentity").field(source).finish()
            }
        }
    }
}

#[cfg(test)]
#[path = "repository_config_tests.rs"]
mod tests;
