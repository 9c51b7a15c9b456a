// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app(app_state: AppState) -> Router {
    // Rotas de leads (funil)
    let lead_routes = Router::new()
        .route(
            "/",
            post(handlers::leads::create_lead).get(handlers::leads::list_leads),
        )
        .route("/kanban", get(handlers::leads::get_kanban))
        .route("/{id}", get(handlers::leads::get_lead))
        .route("/{id}/stage", patch(handlers::leads::update_stage))
        .route("/{id}/triage", post(handlers::leads::triage_lead));

    // Rotas de clientes
    let client_routes = Router::new()
        .route("/", get(handlers::clients::list_clients))
        .route("/from-lead/{lead_id}", post(handlers::clients::convert_lead))
        .route("/{id}", get(handlers::clients::get_client))
        .route("/{id}/messages", post(handlers::clients::send_message));

    let admin_routes =
        Router::new().route("/metrics/overview", get(handlers::metrics::get_overview));

    // Tudo abaixo de /api (menos o health) exige Bearer token
    let protected = Router::new()
        .nest("/api/leads", lead_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .merge(protected)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Settings, StorageBackend};
    use crate::db::InMemoryCrmStore;
    use crate::models::auth::UserRole;
    use crate::pipeline::scoring::ScoringPolicy;
    use crate::services::auth::tests::issue_token;

    const SECRET: &str = "segredo-de-teste";

    fn test_app() -> Router {
        let settings = Settings {
            bind_addr: "127.0.0.1:0".into(),
            jwt_secret: SECRET.into(),
            storage: StorageBackend::Memory,
            database_url: None,
            db_max_connections: 1,
            db_acquire_timeout: Duration::from_secs(1),
            db_statement_timeout: Duration::from_millis(500),
            scoring: ScoringPolicy::default(),
        };
        app(AppState::with_store(settings, Arc::new(InMemoryCrmStore::new())))
    }

    fn bearer(role: UserRole) -> String {
        format!("Bearer {}", issue_token(SECRET, role, chrono::Duration::hours(1)))
    }

    fn json_request(method: &str, uri: &str, role: UserRole, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", bearer(role))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, role: UserRole) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", bearer(role))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn lead_body() -> Value {
        json!({
            "name": "Ana Souza",
            "phone": "41998765432",
            "email": "ana@example.com",
            "source": "INSTAGRAM",
            "interestType": "APARTMENT",
            "budgetMin": 300000,
            "budgetMax": 500000
        })
    }

    async fn create_lead(app: &Router) -> Value {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/leads", UserRole::Admin, lead_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn health_is_public() {
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let request = Request::builder()
            .uri("/api/leads")
            .header("accept-language", "pt-BR")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Token de autenticação inválido ou ausente.");
    }

    #[tokio::test]
    async fn created_lead_starts_new_and_unscored() {
        let app = test_app();
        let lead = create_lead(&app).await;
        assert_eq!(lead["stage"], "NEW");
        assert_eq!(lead["source"], "INSTAGRAM");
        assert!(lead["score"].is_null());

        let uri = format!("/api/leads/{}", lead["id"].as_str().unwrap());
        let response = app.oneshot(get_request(&uri, UserRole::User)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["email"], "ana@example.com");
    }

    #[tokio::test]
    async fn unknown_enum_and_bad_email_are_bad_requests() {
        let app = test_app();

        let mut body = lead_body();
        body["source"] = json!("TIKTOK");
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/leads", UserRole::Admin, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let mut body = lead_body();
        body["email"] = json!("nao-e-email");
        let response = app
            .oneshot(json_request("POST", "/api/leads", UserRole::Admin, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["details"]["email"].is_array());
    }

    #[tokio::test]
    async fn user_role_cannot_mutate() {
        let response = test_app()
            .oneshot(json_request("POST", "/api/leads", UserRole::User, lead_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn stage_moves_show_up_on_the_board() {
        let app = test_app();
        let lead = create_lead(&app).await;
        let id = lead["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/leads/{id}/stage"),
                UserRole::Admin,
                json!({ "stage": "PROPOSAL" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_request("/api/leads/kanban", UserRole::User))
            .await
            .unwrap();
        let board = body_json(response).await;
        for stage in ["NEW", "CONTACTED", "QUALIFIED", "WON", "LOST"] {
            assert_eq!(board[stage], json!([]), "coluna {stage}");
        }
        assert_eq!(board["PROPOSAL"][0]["id"], id);

        let response = app
            .oneshot(get_request("/api/leads?stage=PROPOSAL", UserRole::User))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn terminal_lead_rejects_stage_change() {
        let app = test_app();
        let lead = create_lead(&app).await;
        let uri = format!("/api/leads/{}/stage", lead["id"].as_str().unwrap());

        let lost = json_request("PATCH", &uri, UserRole::Admin, json!({ "stage": "LOST" }));
        assert_eq!(app.clone().oneshot(lost).await.unwrap().status(), StatusCode::OK);

        let back = json_request("PATCH", &uri, UserRole::Admin, json!({ "stage": "NEW" }));
        let response = app.oneshot(back).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["details"]["from"], "LOST");
        assert_eq!(body["details"]["to"], "NEW");
    }

    #[tokio::test]
    async fn hot_triage_qualifies_the_lead() {
        let app = test_app();
        let lead = create_lead(&app).await;
        let uri = format!("/api/leads/{}/triage", lead["id"].as_str().unwrap());

        let submission = json!({
            "interestType": "HOUSE",
            "budget": 450000,
            "cityPreference": "Curitiba",
            "financingApproved": true,
            "urgency": 5,
            "summary": "Quer mudar em 30 dias"
        });
        let response = app
            .clone()
            .oneshot(json_request("POST", &uri, UserRole::Admin, submission))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let triaged = body_json(response).await;
        assert_eq!(triaged["stage"], "QUALIFIED");
        assert_eq!(triaged["interestType"], "HOUSE");
        assert_eq!(triaged["cityPreference"], "Curitiba");
        assert!(triaged["score"].as_i64().unwrap() >= 60);

        let bad = json!({ "interestType": "HOUSE", "budget": 0 });
        let response = app
            .clone()
            .oneshot(json_request("POST", &uri, UserRole::Admin, bad))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get_request("/api/admin/metrics/overview", UserRole::User))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["qualifiedSessions"], 1);
    }

    #[tokio::test]
    async fn conversion_flow_end_to_end() {
        let app = test_app();
        let lead = create_lead(&app).await;
        let uri = format!("/api/clients/from-lead/{}", lead["id"].as_str().unwrap());

        let payload = json!({ "preferredChannel": "email", "tags": ["vip", " vip "] });
        let response = app
            .clone()
            .oneshot(json_request("POST", &uri, UserRole::Admin, payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let client = body_json(response).await;
        assert_eq!(client["preferredChannel"], "email");
        assert_eq!(client["tags"], json!(["vip"]));
        assert_eq!(client["leadId"], lead["id"]);

        let again = app
            .clone()
            .oneshot(json_request("POST", &uri, UserRole::Admin, payload))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::CONFLICT);

        let messages = format!("/api/clients/{}/messages", client["id"].as_str().unwrap());
        let response = app
            .clone()
            .oneshot(json_request("POST", &messages, UserRole::Admin, json!({ "content": "Olá!" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["channel"], "email");

        let response = app
            .oneshot(get_request("/api/admin/metrics/overview", UserRole::User))
            .await
            .unwrap();
        let metrics = body_json(response).await;
        assert_eq!(metrics["totalLeads"], 1);
        assert_eq!(metrics["wonLeads"], 1);
        assert_eq!(metrics["conversionRate"], 100.0);
    }

    #[tokio::test]
    async fn unknown_lead_is_not_found() {
        let uri = format!("/api/leads/{}", uuid::Uuid::new_v4());
        let response = test_app().oneshot(get_request(&uri, UserRole::User)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bad_path_and_query_use_the_error_contract() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(get_request("/api/leads/nao-e-uuid", UserRole::User))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "The request body could not be read.");
        assert!(body["details"]["reason"].is_string());

        let response = app
            .oneshot(get_request("/api/leads?stage=BOGUS", UserRole::User))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["details"]["reason"].is_string());
    }

    #[tokio::test]
    async fn overlong_message_is_a_bad_request() {
        let app = test_app();
        let lead = create_lead(&app).await;
        let uri = format!("/api/clients/from-lead/{}", lead["id"].as_str().unwrap());
        let response = app
            .clone()
            .oneshot(json_request("POST", &uri, UserRole::Admin, json!({})))
            .await
            .unwrap();
        let client = body_json(response).await;

        let messages = format!("/api/clients/{}/messages", client["id"].as_str().unwrap());
        let content = "a".repeat(2001);
        let response = app
            .oneshot(json_request("POST", &messages, UserRole::Admin, json!({ "content": content })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["details"]["content"].is_array());
    }
}
