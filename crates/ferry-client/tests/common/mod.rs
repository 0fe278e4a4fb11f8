//! Scripted transport shared by the pipeline and queue tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ferry_client::{
    ApiRequest, ApiResponse, AuthFailureHandler, HttpClient, Method, RetryPolicy, Transport, TransportError,
};
use ferry_core::AppKind;
use ferry_store::DeviceStorage;
use futures::future::BoxFuture;

type Handler =
    Box<dyn Fn(&ApiRequest, Option<&str>) -> Result<ApiResponse, TransportError> + Send + Sync>;

/// A request as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Answers requests by exact path; unknown paths get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, Handler>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(&ApiRequest, Option<&str>) -> Result<ApiResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        self.routes.insert(path.to_string(), Box::new(handler));
        self
    }

    /// Always answer `path` with `status` and `body`.
    pub fn fixed(self, path: &str, status: u16, body: &str) -> Self {
        let body = body.to_string();
        self.route(path, move |_, _| Ok(ApiResponse::new(status, body.clone())))
    }

    /// Answer 200 with `body` only when the bearer is `token`, else 401.
    pub fn protected(self, path: &str, token: &str, body: &str) -> Self {
        let token = token.to_string();
        let body = body.to_string();
        self.route(path, move |_, bearer| {
            if bearer == Some(token.as_str()) {
                Ok(ApiResponse::new(200, body.clone()))
            } else {
                Ok(ApiResponse::new(401, r#"{"detail":"Token expired"}"#))
            }
        })
    }

    /// Hold every response for `path` by `delay`.
    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

impl Transport for ScriptedTransport {
    fn send<'a>(
        &'a self,
        request: &'a ApiRequest,
        bearer: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ApiResponse, TransportError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(Call {
                method: request.method.clone(),
                path: request.path.clone(),
                query: request.query.clone(),
                bearer: bearer.map(str::to_string),
                body: request.body.clone(),
            });
            if let Some(delay) = self.delays.get(&request.path) {
                tokio::time::sleep(*delay).await;
            }
            match self.routes.get(&request.path) {
                Some(handler) => handler(request, bearer),
                None => Ok(ApiResponse::new(404, r#"{"detail":"Not Found"}"#)),
            }
        })
    }
}

/// Counts invocations of the auth-failure callback.
#[derive(Clone, Default)]
pub struct FailureCounter(Arc<AtomicUsize>);

impl FailureCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn handler(&self) -> Arc<dyn AuthFailureHandler> {
        let inner = Arc::clone(&self.0);
        Arc::new(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }
}

pub fn storage_with_session(app: AppKind, access: &str, refresh: &str) -> DeviceStorage {
    let storage = DeviceStorage::in_memory(app);
    storage.set_tokens(access, refresh).unwrap();
    storage
}

/// Checker client over `transport` without retries.
pub fn checker_client(transport: Arc<ScriptedTransport>, storage: DeviceStorage) -> HttpClient {
    HttpClient::builder(transport, storage)
        .app(AppKind::Checker)
        .build()
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(2))
}

pub fn refresh_ok(access: &str, refresh: &str) -> String {
    serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
    })
    .to_string()
}

pub const SCAN_BODY: &str = r#"{
    "source": "booking",
    "id": 7,
    "reference_no": 1042,
    "status": "CONFIRMED",
    "route_name": "Dabhol - Dhopave",
    "branch_name": "Dabhol",
    "travel_date": "2026-10-16",
    "departure": "09:30",
    "net_amount": 180.0,
    "passenger_count": 2,
    "items": [{"item_name": "Adult", "quantity": 2}],
    "checked_in_at": null,
    "verification_code": "VC-1042"
}"#;

pub const CHECK_IN_BODY: &str = r#"{
    "message": "Checked in",
    "source": "booking",
    "id": 7,
    "reference_no": 1042,
    "checked_in_at": "2026-10-16T09:12:00"
}"#;
