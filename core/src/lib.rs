//! API client core for the product service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! five product operations (list, get, create, update, remove). The
//! `transport` feature (on by default) adds `ProductApi`, which runs the
//! round-trip over `reqwest`; without it the crate touches no network and
//! the host executes requests itself.
//!
//! # Design
//! - `ProductClient` is stateless and holds only the API root URL.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the FFI crate can expose it unchanged.
//! - Products are opaque JSON; payloads go out as given and responses come
//!   back as received, with non-2xx statuses surfaced unaltered.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

#[cfg(feature = "transport")]
pub mod api;

#[cfg(feature = "transport")]
pub use api::ProductApi;
pub use client::{ProductClient, DEFAULT_API_URL, PRODUCTS_PATH};
pub use error::{ApiError, ApiResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{ApiResponse, Product, ProductId};
