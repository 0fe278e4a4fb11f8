//! The request pipeline.
//!
//! Every call passes through three stages, in order:
//! 1. **Bearer injection**: the stored access token (or the token handed over
//!    by a refresh) is attached to the request.
//! 2. **Transient retry** (when enabled): no response or a 5xx is resent after
//!    `base_delay * 2^n` until the policy is exhausted.
//! 3. **401 recovery**: the request joins the [`RefreshGate`]; one refresh runs,
//!    and the request is replayed once with the new token. A failed refresh
//!    clears the session and notifies the [`AuthFailureHandler`].

use std::sync::Arc;

use ferry_config::FerryConfig;
use ferry_core::{AppKind, RefreshResponse};
use ferry_store::DeviceStorage;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::refresh::{RefreshGate, Ticket};
use crate::retry::RetryPolicy;
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

/// Told when the session could not be renewed and has been cleared.
///
/// The host application uses this to send the user back to a login prompt.
pub trait AuthFailureHandler: Send + Sync {
    fn on_auth_failure(&self);
}

impl<F> AuthFailureHandler for F
where
    F: Fn() + Send + Sync,
{
    fn on_auth_failure(&self) {
        self();
    }
}

/// Handler that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuthFailureHandler;

impl AuthFailureHandler for NoopAuthFailureHandler {
    fn on_auth_failure(&self) {}
}

/// One per process. Share it behind an `Arc`.
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    storage: DeviceStorage,
    app: AppKind,
    retry: Option<RetryPolicy>,
    refresh: RefreshGate,
    on_auth_failure: Arc<dyn AuthFailureHandler>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("app", &self.app)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    transport: Arc<dyn Transport>,
    storage: DeviceStorage,
    app: AppKind,
    retry: Option<RetryPolicy>,
    on_auth_failure: Arc<dyn AuthFailureHandler>,
}

impl HttpClientBuilder {
    #[must_use]
    pub const fn app(mut self, app: AppKind) -> Self {
        self.app = app;
        self
    }

    /// Enable transient-failure retries. Off unless set.
    #[must_use]
    pub const fn retry(mut self, policy: Option<RetryPolicy>) -> Self {
        self.retry = policy;
        self
    }

    #[must_use]
    pub fn auth_failure_handler(mut self, handler: Arc<dyn AuthFailureHandler>) -> Self {
        self.on_auth_failure = handler;
        self
    }

    #[must_use]
    pub fn build(self) -> HttpClient {
        HttpClient {
            transport: self.transport,
            storage: self.storage,
            app: self.app,
            retry: self.retry,
            refresh: RefreshGate::default(),
            on_auth_failure: self.on_auth_failure,
        }
    }
}

impl HttpClient {
    #[must_use]
    pub fn builder(transport: Arc<dyn Transport>, storage: DeviceStorage) -> HttpClientBuilder {
        HttpClientBuilder {
            transport,
            storage,
            app: AppKind::default(),
            retry: None,
            on_auth_failure: Arc::new(NoopAuthFailureHandler),
        }
    }

    /// Client over `reqwest` configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn from_config(
        config: &FerryConfig,
        storage: DeviceStorage,
        on_auth_failure: Arc<dyn AuthFailureHandler>,
    ) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config.api.base_url, config.timeout())?;
        let retry = config
            .retry_enabled()
            .then(|| RetryPolicy::from(&config.retry));
        Ok(Self::builder(Arc::new(transport), storage)
            .app(config.app())
            .retry(retry)
            .auth_failure_handler(on_auth_failure)
            .build())
    }

    #[must_use]
    pub const fn app(&self) -> AppKind {
        self.app
    }

    #[must_use]
    pub const fn storage(&self) -> &DeviceStorage {
        &self.storage
    }

    /// Run `request` through the full pipeline. Only 2xx responses are `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the final [`ApiError`] after retries and 401 recovery.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        match self.send_with_retry(&request).await {
            Err(error)
                if error.is_unauthorized()
                    && !request.skip_auth_refresh
                    && !request.refresh_attempted =>
            {
                let token = self.renew_access_token().await?;
                request.refresh_attempted = true;
                request.bearer_override = Some(token);
                self.send_with_retry(&request).await
            }
            other => other,
        }
    }

    /// [`Self::execute`] and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not a valid `T`, otherwise
    /// whatever [`Self::execute`] returns.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// # Errors
    ///
    /// See [`Self::execute_json`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_json(ApiRequest::get(path)).await
    }

    async fn send_with_retry(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut attempt = 0;
        loop {
            match self.dispatch(request).await {
                Err(error) if error.is_transient() => match self.retry {
                    Some(policy) if attempt < policy.max_retries => {
                        let delay = policy.delay_for(attempt);
                        attempt += 1;
                        tracing::warn!(
                            attempt,
                            max_retries = policy.max_retries,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            path = %request.path,
                            %error,
                            "retrying request",
                        );
                        tokio::time::sleep(delay).await;
                    }
                    _ => return Err(error),
                },
                other => return other,
            }
        }
    }

    /// One attempt: attach the bearer token and map non-2xx to an error.
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let stored;
        let bearer = match &request.bearer_override {
            Some(token) => Some(token.as_str()),
            None => {
                stored = self.storage.access_token().unwrap_or_else(|error| {
                    tracing::warn!(%error, "could not read access token; sending unauthenticated");
                    None
                });
                stored.as_deref()
            }
        };

        let response = self.transport.send(request, bearer).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(response.status, &response.body))
        }
    }

    /// Obtain a fresh access token, performing the refresh only if no other
    /// request already is.
    async fn renew_access_token(&self) -> Result<String, ApiError> {
        let leader = match self.refresh.join() {
            Ticket::Waiter(rx) => {
                tracing::debug!("token refresh in progress; waiting");
                return rx.await.unwrap_or_else(|_| {
                    Err(ApiError::SessionExpired {
                        reason: "token refresh was abandoned".into(),
                    })
                });
            }
            Ticket::Leader(guard) => guard,
        };

        match self.exchange_refresh_token().await {
            Ok(token) => {
                leader.settle(&Ok(token.clone()));
                Ok(token)
            }
            Err(cause) => {
                let error = if matches!(cause, ApiError::SessionExpired { .. }) {
                    cause
                } else {
                    ApiError::SessionExpired {
                        reason: cause.to_string(),
                    }
                };
                tracing::error!(%error, "token refresh failed, logging out");
                // The gate stays closed until the session is gone, so a 401
                // arriving now parks instead of reusing the rejected token.
                if let Err(store_error) = self.storage.clear_all() {
                    tracing::error!(%store_error, "failed to clear session after refresh failure");
                }
                self.on_auth_failure.on_auth_failure();
                leader.settle(&Err(error.clone()));
                Err(error)
            }
        }
    }

    /// `POST {auth_prefix}/mobile-refresh` outside the pipeline, then persist
    /// the new pair.
    async fn exchange_refresh_token(&self) -> Result<String, ApiError> {
        let Some(refresh_token) = self.storage.refresh_token()? else {
            return Err(ApiError::SessionExpired {
                reason: "no refresh token stored".into(),
            });
        };

        let request = ApiRequest::post(format!("{}/mobile-refresh", self.app.auth_prefix()))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))?
            .without_auth_refresh();
        let response = self.transport.send(&request, None).await?;
        if !response.is_success() {
            return Err(ApiError::from_response(response.status, &response.body));
        }

        let tokens: RefreshResponse =
            serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.storage
            .set_tokens(&tokens.access_token, &tokens.refresh_token)?;
        tracing::debug!("access token refreshed");
        Ok(tokens.access_token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, OnceLock, Weak};

    use futures::future::BoxFuture;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::TransportError;

    /// 401 for every API call, 400 for the refresh.
    struct RejectingTransport {
        refreshes: AtomicUsize,
    }

    impl Transport for RejectingTransport {
        fn send<'a>(
            &'a self,
            request: &'a ApiRequest,
            _bearer: Option<&'a str>,
        ) -> BoxFuture<'a, Result<ApiResponse, TransportError>> {
            Box::pin(async move {
                if request.path.ends_with("/mobile-refresh") {
                    self.refreshes.fetch_add(1, Ordering::SeqCst);
                    Ok(ApiResponse::new(400, r#"{"detail":"Invalid refresh token"}"#))
                } else {
                    Ok(ApiResponse::new(401, r#"{"detail":"Token expired"}"#))
                }
            })
        }
    }

    #[tokio::test]
    async fn session_is_torn_down_before_refresh_gate_reopens() {
        let transport = Arc::new(RejectingTransport {
            refreshes: AtomicUsize::new(0),
        });
        let storage = DeviceStorage::in_memory(AppKind::Checker);
        storage.set_tokens("access-1", "refresh-1").unwrap();

        let slot: Arc<OnceLock<Weak<HttpClient>>> = Arc::new(OnceLock::new());
        let gate_closed = Arc::new(AtomicBool::new(false));
        let session_cleared = Arc::new(AtomicBool::new(false));
        let handler = {
            let slot = Arc::clone(&slot);
            let gate_closed = Arc::clone(&gate_closed);
            let session_cleared = Arc::clone(&session_cleared);
            move || {
                let client = slot.get().and_then(Weak::upgrade).unwrap();
                gate_closed.store(client.refresh.in_progress(), Ordering::SeqCst);
                session_cleared.store(
                    client.storage.refresh_token().unwrap().is_none(),
                    Ordering::SeqCst,
                );
            }
        };
        let client = Arc::new(
            HttpClient::builder(transport.clone(), storage)
                .auth_failure_handler(Arc::new(handler))
                .build(),
        );
        slot.set(Arc::downgrade(&client)).unwrap();

        let error = client
            .execute(ApiRequest::get("/api/verification/scan"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::SessionExpired { .. }), "{error:?}");
        assert!(gate_closed.load(Ordering::SeqCst));
        assert!(session_cleared.load(Ordering::SeqCst));
        assert!(!client.refresh.in_progress());
        assert_eq!(transport.refreshes.load(Ordering::SeqCst), 1);
    }
}
