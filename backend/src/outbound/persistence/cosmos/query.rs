//! Parameterised SQL queries that can only be built against one partition.

use serde_json::{Value, json};

use super::PartitionKey;

/// A query whose first predicate always pins the configured partition.
///
/// Additional predicates are equality filters on plain document fields. The
/// partition predicate cannot be removed, so a cross-partition scan is not
/// expressible through this type.
#[derive(Debug, Clone)]
pub(crate) struct PartitionScopedQuery {
    partition: PartitionKey,
    filters: Vec<(&'static str, Value)>,
}

impl PartitionScopedQuery {
    pub(crate) fn new(partition: &PartitionKey) -> Self {
        Self {
            partition: partition.clone(),
            filters: Vec::new(),
        }
    }

    /// Require `c.<field> = value`. `field` must be an identifier.
    pub(crate) fn with_equals(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push((field, value.into()));
        self
    }

    pub(crate) fn partition(&self) -> &PartitionKey {
        &self.partition
    }

    pub(crate) fn text(&self) -> String {
        let mut text = format!(
            "SELECT * FROM c WHERE c[\"{}\"] = @partitionValue",
            self.partition.name()
        );
        for (field, _) in &self.filters {
            text.push_str(&format!(" AND c.{field} = @{field}"));
        }
        text
    }

    /// Body for a `application/query+json` request.
    pub(crate) fn to_body(&self) -> Value {
        let mut parameters = vec![json!({
            "name": "@partitionValue",
            "value": self.partition.value(),
        })];
        parameters.extend(self.filters.iter().map(|(field, value)| {
            json!({
                "name": format!("@{field}"),
                "value": value,
            })
        }));
        json!({
            "query": self.text(),
            "parameters": parameters,
        })
    }
}
