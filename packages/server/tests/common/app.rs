//! In-process router client for HTTP tests (no database needed).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use server_core::common::UserId;
use server_core::domains::auth::JwtService;
use server_core::kernel::TestDependencies;
use server_core::server::{build_app, AppOptions, AppState};
use tower::ServiceExt;

pub const WORKER_TOKEN: &str = "worker-accept-token";

pub enum Auth<'a> {
    None,
    User(UserId),
    Worker,
    Raw(&'a str),
}

pub struct TestApp {
    pub deps: TestDependencies,
    pub jwt: Arc<JwtService>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    pub fn with_deps(deps: TestDependencies) -> Self {
        let jwt = Arc::new(JwtService::new("test_secret_key", "storypool".to_string()));
        let state = AppState {
            deps: deps.server_deps(),
            jwt_service: jwt.clone(),
            worker_accept_token: Arc::from(WORKER_TOKEN),
        };
        let router = build_app(state, AppOptions::default());

        Self { deps, jwt, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        auth: Auth<'_>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let authorization = match auth {
            Auth::None => None,
            Auth::User(user_id) => Some(format!(
                "Bearer {}",
                self.jwt.create_token(user_id).expect("token")
            )),
            Auth::Worker => Some(format!("Bearer {}", WORKER_TOKEN)),
            Auth::Raw(value) => Some(value.to_string()),
        };
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Raw request body, for malformed JSON cases.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        auth: Auth<'_>,
        body: &str,
    ) -> (StatusCode, Value) {
        let authorization = match auth {
            Auth::User(user_id) => format!("Bearer {}", self.jwt.create_token(user_id).expect("token")),
            Auth::Worker => format!("Bearer {}", WORKER_TOKEN),
            Auth::Raw(value) => value.to_string(),
            Auth::None => String::new(),
        };

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, authorization)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
