use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::shared::app_state::AppState;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A002 Campus
        .route(
            "/api/campus",
            get(handlers::a002_campus::list_all).post(handlers::a002_campus::create),
        )
        // A001 Inventory
        .route(
            "/api/inventory",
            get(handlers::a001_inventory_item::list).post(handlers::a001_inventory_item::create),
        )
        .route(
            "/api/inventory/:category/:id",
            get(handlers::a001_inventory_item::get_by_id)
                .put(handlers::a001_inventory_item::update)
                .delete(handlers::a001_inventory_item::delete),
        )
        .route(
            "/api/inventory/:category/:id/condition",
            post(handlers::a001_inventory_item::set_condition),
        )
        .route(
            "/api/inventory/:category/:id/deduct",
            post(handlers::a001_inventory_item::deduct),
        )
        // D400 Inventory overview
        .route(
            "/api/d400/overview",
            get(handlers::d400_inventory_overview::get_overview),
        )
        // A003 Health requests
        .route(
            "/api/requests",
            get(handlers::a003_health_request::list).post(handlers::a003_health_request::submit),
        )
        .route(
            "/api/requests/:id/approve",
            post(handlers::a003_health_request::approve),
        )
        .route(
            "/api/requests/:id/reject",
            post(handlers::a003_health_request::reject),
        )
        // A004/A005 Laptop workflow
        .route(
            "/api/laptops/submissions",
            get(handlers::a004_laptop_submission::list)
                .post(handlers::a004_laptop_submission::submit),
        )
        .route(
            "/api/laptops/submissions/:id/return",
            post(handlers::a004_laptop_submission::process_return),
        )
        .route(
            "/api/laptops/returns",
            get(handlers::a005_laptop_return::list),
        )
        // A006 Notifications
        .route(
            "/api/notifications",
            get(handlers::a006_notification::list),
        )
        .route(
            "/api/notifications/:collection/:id/read",
            post(handlers::a006_notification::mark_read),
        )
        .route(
            "/api/notifications/:collection/:id",
            axum::routing::delete(handlers::a006_notification::delete),
        )
        // UseCase u501: Restock recommendation
        .route(
            "/api/u501/recommendation",
            post(handlers::usecases::u501_recommendation),
        )
        // UseCase u502: Admin message
        .route(
            "/api/u502/message",
            post(handlers::usecases::u502_message),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::app_state::test_support::memory_state;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    /// Поднять роутер на свободном порту, вернуть базовый URL
    async fn serve(state: AppState) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, configure_routes(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn as_user(builder: reqwest::RequestBuilder, role: &str) -> reqwest::RequestBuilder {
        builder.header("x-user-id", "u-1").header("x-user-role", role)
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let (state, _) = memory_state();
        let base = serve(state).await;
        let response = reqwest::get(format!("{}/api/inventory", base)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_create_then_list_with_search() {
        let (state, _) = memory_state();
        let base = serve(state.clone()).await;
        let client = reqwest::Client::new();

        let created = as_user(client.post(format!("{}/api/inventory", base)), "manager")
            .json(&json!({"name": "Printer Paper", "category": "office_supplies", "quantity": 40}))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let mut rx = state.feed.watch();
        tokio::time::timeout(
            std::time::Duration::from_secs(2),
            rx.wait_for(|s| s.items.len() == 1),
        )
        .await
        .unwrap()
        .unwrap();

        let url = format!("{}/api/inventory?q=PAPER&sort_by=name", base);
        let listed = as_user(client.get(url), "staff")
            .send()
            .await
            .unwrap();
        assert_eq!(listed.status(), StatusCode::OK);
        let body: Value = listed.json().await.unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_staff_cannot_delete_items() {
        let (state, _) = memory_state();
        let base = serve(state).await;
        let url = format!("{}/api/inventory/food/abc", base);
        let response = as_user(reqwest::Client::new().delete(url), "staff")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_category_is_bad_request() {
        let (state, _) = memory_state();
        let base = serve(state).await;
        let url = format!("{}/api/inventory/toys/abc", base);
        let response = as_user(reqwest::Client::new().get(url), "staff")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
