//! Async transport: runs the round-trip between `build_*` and `parse_*`.
//!
//! # Design
//! `ProductApi` is a thin executor. It owns a `ProductClient` for request
//! shapes and a `reqwest::Client` for I/O, and it adds nothing else: no
//! timeout, retry or caching. Configure those on the `reqwest::Client` handed
//! to `with_http_client`. Both halves are cheap to clone, so one
//! `ProductApi` can be shared across tasks and called concurrently.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::ProductClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ApiResponse, Product, ProductId};

#[derive(Debug, Clone, Default)]
pub struct ProductApi {
    client: ProductClient,
    http: reqwest::Client,
}

impl ProductApi {
    pub fn new(client: ProductClient) -> Self {
        Self::with_http_client(client, reqwest::Client::new())
    }

    pub fn with_http_client(client: ProductClient, http: reqwest::Client) -> Self {
        Self { client, http }
    }

    pub fn client(&self) -> &ProductClient {
        &self.client
    }

    /// GET `<base>`.
    pub async fn list(&self) -> ApiResult<ApiResponse<Vec<Product>>> {
        let response = self.execute(self.client.build_list_products()).await?;
        self.client.parse_list_products(response)
    }

    /// GET `<base>/{id}`.
    pub async fn get(&self, id: impl Into<ProductId>) -> ApiResult<ApiResponse<Product>> {
        let response = self.execute(self.client.build_get_product(id)).await?;
        self.client.parse_get_product(response)
    }

    /// POST `<base>` with `data` as the JSON body.
    pub async fn create<T>(&self, data: &T) -> ApiResult<ApiResponse<Product>>
    where
        T: Serialize + ?Sized,
    {
        let response = self.execute(self.client.build_create_product(data)?).await?;
        self.client.parse_create_product(response)
    }

    /// PUT `<base>/{id}` with `data` as the JSON body.
    pub async fn update<T>(&self, id: impl Into<ProductId>, data: &T) -> ApiResult<ApiResponse<Product>>
    where
        T: Serialize + ?Sized,
    {
        let response = self.execute(self.client.build_update_product(id, data)?).await?;
        self.client.parse_update_product(response)
    }

    /// DELETE `<base>/{id}`.
    pub async fn remove(&self, id: impl Into<ProductId>) -> ApiResult<ApiResponse<Value>> {
        let response = self.execute(self.client.build_delete_product(id)).await?;
        self.client.parse_delete_product(response)
    }

    /// Send `request` and collect the response whatever its status.
    pub async fn execute(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        debug!(method = %request.method, path = %request.path, "sending request");

        let mut builder = self.http.request(to_reqwest_method(request.method), &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, headers, body })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}
