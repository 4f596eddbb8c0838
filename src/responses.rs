//! # List Responses and Query Options
//!
//! Shape of every collection endpoint: `{"items": [...], "metadata": {...}}`,
//! and the `_sort`/`_include`/`_size`/`_offset` query conventions used to
//! request them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{ClientError, ClientResult};

/// Pagination block of list metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub size: u64,
    pub offset: u64,
}

/// Metadata returned alongside list items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListMetadata {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    /// Any other metadata the server sends
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ordered sequence of entities plus metadata, in server order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub metadata: ListMetadata,
}

impl<T> ListResponse<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Total matching entities on the server, if the server paginated
    pub fn total(&self) -> Option<u64> {
        self.metadata.pagination.map(|p| p.total)
    }
}

impl<T> IntoIterator for ListResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ListResponse<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Decode a response payload into `T`, naming `what` when the shape is wrong
pub(crate) fn decode<T: DeserializeOwned>(what: &str, payload: Value) -> ClientResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| ClientError::invalid_response(what, e.to_string()))
}

/// Options for list operations
///
/// # Example
///
/// ```
/// use cloudify_rest_client::ListOptions;
///
/// let opts = ListOptions::new()
///     .sort("key")
///     .descending(true)
///     .filter("tenant_name", "default_tenant");
///
/// let params = opts.to_query_params();
/// assert!(params.contains(&("_sort".to_string(), "-key".to_string())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Field to sort by
    pub sort: Option<String>,
    /// Reverse the sort order; ignored without `sort`
    pub is_descending: bool,
    /// Restrict the returned fields
    pub include: Vec<String>,
    /// Page size
    pub size: Option<u64>,
    /// Page offset
    pub offset: Option<u64>,
    /// Field filters, sent as plain query parameters
    pub filters: BTreeMap<String, String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sort(mut self, field: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self
    }

    #[must_use]
    pub fn descending(mut self, is_descending: bool) -> Self {
        self.is_descending = is_descending;
        self
    }

    #[must_use]
    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn paginate(mut self, size: u64, offset: u64) -> Self {
        self.size = Some(size);
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Render as query parameters: filters first, then the reserved `_` keys
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if let Some(sort) = &self.sort {
            let sort = if self.is_descending {
                format!("-{}", sort)
            } else {
                sort.clone()
            };
            params.push(("_sort".to_string(), sort));
        }
        if !self.include.is_empty() {
            params.push(("_include".to_string(), self.include.join(",")));
        }
        if let Some(size) = self.size {
            params.push(("_size".to_string(), size.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("_offset".to_string(), offset.to_string()));
        }
        params
    }
}
