//! Minimal REST client for one Cosmos DB container.

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::credential::{CosmosCredential, CredentialError};
use super::query::PartitionScopedQuery;
use super::signature::{ResourceType, SignedRequest};
use super::PartitionKey;

const API_VERSION: &str = "2018-12-31";
const MS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
const HEADER_DATE: &str = "x-ms-date";
const HEADER_VERSION: &str = "x-ms-version";
const HEADER_PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";
const HEADER_IS_QUERY: &str = "x-ms-documentdb-isquery";
const HEADER_CONTINUATION: &str = "x-ms-continuation";

/// Failures talking to the Cosmos REST API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum CosmosError {
    #[error("cosmos request could not be sent: {message}")]
    Transport { message: String },
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("cosmos rejected the request credentials ({status})")]
    Unauthorized { status: u16 },
    #[error("cosmos returned {status} ({code})")]
    Status { status: u16, code: String },
    #[error("cosmos payload could not be processed: {message}")]
    Payload { message: String },
}

impl CosmosError {
    /// True when the store could not be reached or refused our identity.
    pub(crate) fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Credential(_) | Self::Unauthorized { .. }
        )
    }

    fn payload(err: impl std::fmt::Display) -> Self {
        Self::Payload {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CreateOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplaceOutcome {
    Replaced,
    Missing,
}

#[derive(Deserialize)]
struct QueryPage {
    #[serde(rename = "Documents", default)]
    documents: Vec<Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
}

struct Call<'a> {
    method: Method,
    resource_type: ResourceType,
    resource_link: String,
    path: String,
    partition: Option<&'a PartitionKey>,
    content_type: Option<&'static str>,
    continuation: Option<String>,
    body: Option<Vec<u8>>,
}

/// Signed requests against `dbs/<database>/colls/<container>`.
#[derive(Debug)]
pub(crate) struct CosmosClient {
    http: reqwest::Client,
    endpoint: Url,
    database: String,
    container: String,
    credential: CosmosCredential,
}

impl CosmosClient {
    pub(crate) fn new(
        http: reqwest::Client,
        endpoint: Url,
        database: String,
        container: String,
        credential: CosmosCredential,
    ) -> Self {
        Self {
            http,
            endpoint,
            database,
            container,
            credential,
        }
    }

    pub(crate) fn credential(&self) -> &CosmosCredential {
        &self.credential
    }

    fn container_link(&self) -> String {
        format!("dbs/{}/colls/{}", self.database, self.container)
    }

    fn document_link(&self, id: &str) -> String {
        format!("{}/docs/{id}", self.container_link())
    }

    /// Read the container's metadata to prove reachability and credentials.
    pub(crate) async fn read_container(&self) -> Result<(), CosmosError> {
        let link = self.container_link();
        let response = self
            .execute(Call {
                method: Method::GET,
                resource_type: ResourceType::Collection,
                path: link.clone(),
                resource_link: link,
                partition: None,
                content_type: None,
                continuation: None,
                body: None,
            })
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(failure(response).await)
        }
    }

    pub(crate) async fn create_document(
        &self,
        partition: &PartitionKey,
        document: &Value,
    ) -> Result<CreateOutcome, CosmosError> {
        let link = self.container_link();
        let response = self
            .execute(Call {
                method: Method::POST,
                resource_type: ResourceType::Document,
                path: format!("{link}/docs"),
                resource_link: link,
                partition: Some(partition),
                content_type: Some("application/json"),
                continuation: None,
                body: Some(serde_json::to_vec(document).map_err(CosmosError::payload)?),
            })
            .await?;
        match response.status() {
            status if status.is_success() => Ok(CreateOutcome::Created),
            StatusCode::CONFLICT => Ok(CreateOutcome::AlreadyExists),
            _ => Err(failure(response).await),
        }
    }

    pub(crate) async fn read_document(
        &self,
        partition: &PartitionKey,
        id: &str,
    ) -> Result<Option<Value>, CosmosError> {
        let link = self.document_link(id);
        let response = self
            .execute(Call {
                method: Method::GET,
                resource_type: ResourceType::Document,
                path: link.clone(),
                resource_link: link,
                partition: Some(partition),
                content_type: None,
                continuation: None,
                body: None,
            })
            .await?;
        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(CosmosError::payload),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(failure(response).await),
        }
    }

    pub(crate) async fn replace_document(
        &self,
        partition: &PartitionKey,
        id: &str,
        document: &Value,
    ) -> Result<ReplaceOutcome, CosmosError> {
        let link = self.document_link(id);
        let response = self
            .execute(Call {
                method: Method::PUT,
                resource_type: ResourceType::Document,
                path: link.clone(),
                resource_link: link,
                partition: Some(partition),
                content_type: Some("application/json"),
                continuation: None,
                body: Some(serde_json::to_vec(document).map_err(CosmosError::payload)?),
            })
            .await?;
        match response.status() {
            status if status.is_success() => Ok(ReplaceOutcome::Replaced),
            StatusCode::NOT_FOUND => Ok(ReplaceOutcome::Missing),
            _ => Err(failure(response).await),
        }
    }

    /// Run `query` and follow continuation tokens until every page is read.
    pub(crate) async fn query_documents(
        &self,
        query: &PartitionScopedQuery,
    ) -> Result<Vec<Value>, CosmosError> {
        let body = serde_json::to_vec(&query.to_body()).map_err(CosmosError::payload)?;
        let link = self.container_link();
        let mut documents = Vec::new();
        let mut continuation = None;
        let mut pages = 0_usize;

        loop {
            let response = self
                .execute(Call {
                    method: Method::POST,
                    resource_type: ResourceType::Document,
                    path: format!("{link}/docs"),
                    resource_link: link.clone(),
                    partition: Some(query.partition()),
                    content_type: Some("application/query+json"),
                    continuation: continuation.take(),
                    body: Some(body.clone()),
                })
                .await?;
            if !response.status().is_success() {
                return Err(failure(response).await);
            }

            continuation = response
                .headers()
                .get(HEADER_CONTINUATION)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_owned);
            let page: QueryPage = response.json().await.map_err(CosmosError::payload)?;
            documents.extend(page.documents);
            pages += 1;

            if continuation.is_none() {
                break;
            }
        }

        debug!(pages, documents = documents.len(), "cosmos query complete");
        Ok(documents)
    }

    async fn execute(&self, call: Call<'_>) -> Result<Response, CosmosError> {
        let date = Utc::now().format(MS_DATE_FORMAT).to_string();
        let authorization = self
            .credential
            .authorization(&SignedRequest {
                method: &call.method,
                resource_type: call.resource_type,
                resource_link: &call.resource_link,
                date: &date,
            })
            .await?;
        let url = self
            .endpoint
            .join(&call.path)
            .map_err(CosmosError::payload)?;

        let mut request = self
            .http
            .request(call.method, url)
            .header(AUTHORIZATION, authorization)
            .header(HEADER_DATE, date)
            .header(HEADER_VERSION, API_VERSION);
        if let Some(partition) = call.partition {
            request = request.header(HEADER_PARTITION_KEY, partition.header_value());
        }
        if let Some(content_type) = call.content_type {
            request = request.header(CONTENT_TYPE, content_type);
            if content_type == "application/query+json" {
                request = request.header(HEADER_IS_QUERY, "True");
            }
        }
        if let Some(token) = call.continuation {
            request = request.header(HEADER_CONTINUATION, token);
        }
        if let Some(body) = call.body {
            request = request.body(body);
        }

        request.send().await.map_err(|err| CosmosError::Transport {
            message: err.without_url().to_string(),
        })
    }
}

async fn failure(response: Response) -> CosmosError {
    let status = response.status();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return CosmosError::Unauthorized {
            status: status.as_u16(),
        };
    }
    let code = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.code)
        .unwrap_or_else(|| "unknown".to_owned());
    CosmosError::Status {
        status: status.as_u16(),
        code,
    }
}
