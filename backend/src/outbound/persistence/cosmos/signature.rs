//! Authorization header values for the Cosmos DB REST API.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Resource type segment signed alongside the resource link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceType {
    Collection,
    Document,
}

impl ResourceType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "colls",
            Self::Document => "docs",
        }
    }
}

/// What a request signature covers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SignedRequest<'a> {
    pub(crate) method: &'a Method,
    pub(crate) resource_type: ResourceType,
    pub(crate) resource_link: &'a str,
    pub(crate) date: &'a str,
}

impl SignedRequest<'_> {
    fn payload(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n\n",
            self.method.as_str().to_ascii_lowercase(),
            self.resource_type.as_str(),
            self.resource_link,
            self.date.to_ascii_lowercase(),
        )
    }
}

/// Sign `request` with the decoded account key.
pub(crate) fn master_key_authorization(
    account_key: &[u8],
    request: &SignedRequest<'_>,
) -> Result<String, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(account_key)?;
    mac.update(request.payload().as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());
    Ok(encode(&format!("type=master&ver=1.0&sig={signature}")))
}

/// Wrap a bearer token obtained from the identity provider.
pub(crate) fn token_authorization(token: &str) -> String {
    encode(&format!("type=aad&ver=1.0&sig={token}"))
}

fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
