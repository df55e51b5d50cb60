//! Cosmos DB SQL API plumbing over its REST surface.
//!
//! Every document operation is bound to a [`PartitionKey`]; the client has no
//! entry point that reaches documents without one.

mod client;
mod credential;
mod query;
mod signature;

pub(crate) use client::{CosmosClient, CosmosError, CreateOutcome, ReplaceOutcome};
pub(crate) use credential::CosmosCredential;
pub(crate) use query::PartitionScopedQuery;

/// Document fields owned by the order mapping; a partition key may not reuse them.
const RESERVED_FIELDS: [&str; 5] = ["id", "orderId", "customerId", "items", "status"];

/// Errors raised while validating a partition key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionKeyError {
    /// The field name is not a plain identifier.
    #[error("partition key name {name:?} must be an identifier")]
    InvalidName { name: String },
    /// The field name collides with a field the order mapping writes.
    #[error("partition key name {name:?} is reserved")]
    ReservedName { name: String },
}

/// Partition field name and the single value this deployment writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionKey {
    name: String,
    value: String,
}

impl PartitionKey {
    /// Validate and build a partition key.
    ///
    /// # Examples
    /// ```
    /// use order_service::outbound::persistence::PartitionKey;
    ///
    /// let key = PartitionKey::new("storeId", "pets").unwrap();
    /// assert_eq!(key.name(), "storeId");
    /// assert!(PartitionKey::new("store id", "pets").is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, PartitionKeyError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(PartitionKeyError::InvalidName { name });
        }
        if RESERVED_FIELDS.contains(&name.as_str()) {
            return Err(PartitionKeyError::ReservedName { name });
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// Document field holding the partition value.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Partition value stamped on every written document.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// JSON array form used by the `x-ms-documentdb-partitionkey` header.
    pub(crate) fn header_value(&self) -> String {
        serde_json::Value::Array(vec![serde_json::Value::String(self.value.clone())]).to_string()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("storeId")]
    #[case("_tenant")]
    #[case("region2")]
    fn accepts_identifiers(#[case] name: &str) {
        let key = PartitionKey::new(name, "pets").expect("valid key");
        assert_eq!(key.name(), name);
        assert_eq!(key.value(), "pets");
    }

    #[rstest]
    #[case("")]
    #[case("2store")]
    #[case("store id")]
    #[case("store\"]")]
    fn rejects_non_identifiers(#[case] name: &str) {
        let err = PartitionKey::new(name, "pets").expect_err("invalid key");
        assert!(matches!(err, PartitionKeyError::InvalidName { .. }));
    }

    #[rstest]
    #[case("id")]
    #[case("status")]
    #[case("orderId")]
    fn rejects_fields_the_mapping_owns(#[case] name: &str) {
        let err = PartitionKey::new(name, "pets").expect_err("reserved key");
        assert!(matches!(err, PartitionKeyError::ReservedName { .. }));
    }

    #[rstest]
    fn header_value_is_a_json_array() {
        let key = PartitionKey::new("storeId", "pet \"shop\"").expect("valid key");
        assert_eq!(key.header_value(), r#"["pet \"shop\""]"#);
    }
}
