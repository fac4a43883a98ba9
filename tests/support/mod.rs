//! Shared helpers for integration tests: local stub servers and configs.

#![allow(dead_code)]

use axum::Router;
use character_mirror::config::{Config, DbConfig, ServerConfig, SourceConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;

/// Bind an ephemeral port on localhost.
pub async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Serve `app` on an already-bound listener in the background.
pub fn spawn(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

/// Bind and serve in one step when the router does not need its own address.
pub async fn serve(app: Router) -> SocketAddr {
    let (listener, addr) = bind().await;
    spawn(listener, app);
    addr
}

pub fn source_config(addr: SocketAddr) -> SourceConfig {
    SourceConfig {
        base_url: format!("http://{}/api", addr),
        timeout_secs: 2,
        max_pages: 10,
    }
}

pub fn config(db_path: &Path, upstream: SocketAddr) -> Config {
    Config {
        db: DbConfig {
            path: db_path.to_path_buf(),
        },
        source: source_config(upstream),
        server: ServerConfig {
            bind: "127.0.0.1:0".to_string(),
        },
    }
}

pub fn character(id: i64, name: &str, status: &str, gender: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": status,
        "gender": gender,
        "species": "Human",
    })
}

/// A single-page upstream envelope.
pub fn page(results: Vec<Value>, next: Option<String>) -> Value {
    json!({
        "info": {
            "count": results.len(),
            "pages": 1,
            "next": next,
            "prev": null,
        },
        "results": results,
    })
}
