//! Domain types for the product API.
//!
//! # Design
//! The backend owns the product schema, so `Product` is an opaque JSON
//! record: whatever the caller sends is forwarded, whatever the backend
//! returns is handed back. Only the `id` member is ever looked at, and only
//! on request. The mock-server crate defines its own product type; the
//! integration tests catch drift between the two.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Integer identifier of a product, rendered bare as a URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product record as the backend returns it.
///
/// Key order and any integer that fits in i64/u64 survive a round-trip.
/// Larger integers decode as f64 and may lose precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(Value);

impl Product {
    /// The `id` member, when present as a non-negative integer.
    pub fn id(&self) -> Option<ProductId> {
        self.0.get("id").and_then(Value::as_u64).map(ProductId)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Product {
    fn from(value: Value) -> Self {
        Product(value)
    }
}

/// A decoded backend response: status and headers as received, body
/// decoded into `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
