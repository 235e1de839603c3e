//! Stateless HTTP request builder and response parser for the product API.
//!
//! # Design
//! `ProductClient` holds only the API root URL. Each operation is split into
//! a `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; the round-trip in between belongs to the
//! caller. Payloads are never inspected or rewritten on the way out, and
//! responses are decoded but otherwise passed back as received.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ApiResponse, Product, ProductId};

/// API root of the backend when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// Resource path of products under the API root.
pub const PRODUCTS_PATH: &str = "/productos";

/// Synchronous, stateless client for the product API.
#[derive(Debug, Clone)]
pub struct ProductClient {
    base_url: String,
}

impl Default for ProductClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ProductClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            base_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Collection URL, e.g. `http://127.0.0.1:8000/api/productos`.
    pub fn products_url(&self) -> String {
        format!("{}{PRODUCTS_PATH}", self.base_url)
    }

    fn product_url(&self, id: ProductId) -> String {
        format!("{}{PRODUCTS_PATH}/{id}", self.base_url)
    }

    pub fn build_list_products(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.products_url(),
            headers: accept_json(),
            body: None,
        }
    }

    pub fn build_get_product(&self, id: impl Into<ProductId>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.product_url(id.into()),
            headers: accept_json(),
            body: None,
        }
    }

    pub fn build_create_product<T>(&self, data: &T) -> ApiResult<HttpRequest>
    where
        T: Serialize + ?Sized,
    {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.products_url(),
            headers: json_body_headers(),
            body: Some(encode(data)?),
        })
    }

    pub fn build_update_product<T>(&self, id: impl Into<ProductId>, data: &T) -> ApiResult<HttpRequest>
    where
        T: Serialize + ?Sized,
    {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.product_url(id.into()),
            headers: json_body_headers(),
            body: Some(encode(data)?),
        })
    }

    pub fn build_delete_product(&self, id: impl Into<ProductId>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.product_url(id.into()),
            headers: accept_json(),
            body: None,
        }
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> ApiResult<ApiResponse<Vec<Product>>> {
        decode(response)
    }

    pub fn parse_get_product(&self, response: HttpResponse) -> ApiResult<ApiResponse<Product>> {
        decode(response)
    }

    pub fn parse_create_product(&self, response: HttpResponse) -> ApiResult<ApiResponse<Product>> {
        decode(response)
    }

    pub fn parse_update_product(&self, response: HttpResponse) -> ApiResult<ApiResponse<Product>> {
        decode(response)
    }

    /// The delete body is whatever the backend chose to send: nothing
    /// (`Null`), JSON, or plain text (kept as a JSON string).
    pub fn parse_delete_product(&self, response: HttpResponse) -> ApiResult<ApiResponse<Value>> {
        check_status(&response)?;
        let data = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).unwrap_or_else(|_| Value::String(response.body.clone()))
        };
        Ok(ApiResponse {
            status: response.status,
            headers: response.headers,
            data,
        })
    }
}

fn accept_json() -> Vec<(String, String)> {
    vec![("accept".to_string(), "application/json".to_string())]
}

fn json_body_headers() -> Vec<(String, String)> {
    vec![
        ("accept".to_string(), "application/json".to_string()),
        ("content-type".to_string(), "application/json".to_string()),
    ]
}

fn encode<T: Serialize + ?Sized>(data: &T) -> ApiResult<String> {
    serde_json::to_string(data).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<ApiResponse<T>> {
    check_status(&response)?;
    let data = serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    Ok(ApiResponse {
        status: response.status,
        headers: response.headers,
        data,
    })
}

/// Any status outside 2xx becomes `HttpError` with status and body untouched.
fn check_status(response: &HttpResponse) -> ApiResult<()> {
    if response.is_success() {
        return Ok(());
    }
    debug!(status = response.status, "backend returned non-success status");
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
