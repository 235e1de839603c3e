//! In-memory stand-in for the product backend.
//!
//! Serves a resource controller under `/api/productos` the way the real
//! backend does: sequential integer ids, 201 on create, merge on update,
//! 204 on delete, 404 for unknown ids.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// A stored product: the server-assigned id plus whatever fields the
/// client sent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug)]
pub struct Store {
    next_id: u64,
    products: BTreeMap<u64, Product>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            next_id: 1,
            products: BTreeMap::new(),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Bind address, read from `HOST` / `PORT`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Unset or unparsable variables fall back to `127.0.0.1:8000`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("HOST").unwrap_or(defaults.host);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        Self { host, port }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/productos", get(list_products).post(create_product))
        .route(
            "/api/productos/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock product backend listening");
    }
    axum::serve(listener, app()).await
}

/// Bind `config` and serve until the process exits.
pub async fn serve(config: &ServerConfig) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(config.addr()).await?;
    run(listener).await
}

async fn list_products(State(db): State<Db>) -> Json<Vec<Product>> {
    let store = db.read().await;
    Json(store.products.values().cloned().collect())
}

async fn create_product(
    State(db): State<Db>,
    Json(mut fields): Json<Map<String, Value>>,
) -> (StatusCode, Json<Product>) {
    fields.remove("id");
    let mut store = db.write().await;
    let id = store.next_id;
    store.next_id += 1;
    let product = Product { id, fields };
    store.products.insert(id, product.clone());
    debug!(id, "product created");
    (StatusCode::CREATED, Json(product))
}

async fn get_product(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Product>, StatusCode> {
    let store = db.read().await;
    store.products.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(mut input): Json<Map<String, Value>>,
) -> Result<Json<Product>, StatusCode> {
    input.remove("id");
    let mut store = db.write().await;
    let product = store.products.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    for (key, value) in input {
        product.fields.insert(key, value);
    }
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .products
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
