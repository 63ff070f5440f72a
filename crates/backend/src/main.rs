#![allow(
    clippy::useless_format,
    clippy::type_complexity,
    clippy::too_many_arguments,
    clippy::len_without_is_empty
)]

pub mod dashboards;
pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use std::sync::Arc;

use shared::app_state::AppState;
use shared::config::{get_database_path, load_config};
use shared::data::db::initialize_database;
use shared::data::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
use system::tasks::stock_alert_worker::StockAlertWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::http::{header, HeaderName, Method, Request};
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    system::tracing::initialize()?;

    // Функция для форматирования чисел с разделителями триад
    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        for (i, ch) in s.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push('.');
            }
            result.push(ch);
        }
        result.chars().rev().collect()
    }

    // Простой middleware для логирования запросов
    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        use axum::body::to_bytes;
        use chrono::Local;

        let start = std::time::Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let response = next.run(req).await;
        let (parts, body) = response.into_parts();

        let bytes = match to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("{} {} response body could not be read: {}", method, uri.path(), e);
                return Response::from_parts(parts, Body::default());
            }
        };

        let status = parts.status.as_u16();
        // голубой для 2xx, коричневый для остальных
        let color_code = if parts.status.is_success() { "36" } else { "33" };
        println!(
            "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
            color_code,
            Local::now().format("%H:%M:%S"),
            start.elapsed().as_millis(),
            format_number(bytes.len()),
            status,
            method,
            uri.path()
        );
        tracing::debug!("{} {} -> {}", method, uri.path(), status);

        Response::from_parts(parts, Body::from(bytes))
    }

    let config = load_config()?;

    let store: Arc<dyn DocumentStore> = if config.database.is_in_memory() {
        tracing::warn!("Using in-memory document store, data is lost on exit");
        Arc::new(MemoryDocumentStore::new())
    } else {
        let db_path = get_database_path(&config);
        let conn = initialize_database(&db_path)
            .await
            .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;
        Arc::new(SqliteDocumentStore::new(conn))
    };
    tracing::info!("Document store: {}", store.backend_name());

    let host = config.server.host.clone();
    let port = config.server.port;
    let alert_interval = config.inventory.alert_interval_seconds;
    let state = AppState::new(config, store);

    let worker = StockAlertWorker::new(state.clone(), alert_interval);
    tokio::spawn(async move {
        worker.run_loop().await;
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(system::auth::extractor::USER_ID_HEADER),
            HeaderName::from_static(system::auth::extractor::USER_EMAIL_HEADER),
            HeaderName::from_static(system::auth::extractor::USER_NAME_HEADER),
            HeaderName::from_static(system::auth::extractor::USER_ROLE_HEADER),
        ]);

    let app = routes::configure_routes(state)
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let ip: std::net::IpAddr = host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server.host '{}': {}", host, e))?;
    let addr = SocketAddr::new(ip, port);

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Stop the other process using it.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
