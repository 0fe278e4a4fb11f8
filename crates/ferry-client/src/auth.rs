//! Login, logout and account endpoints.
//!
//! Endpoints live under the app's auth prefix (`/api/auth` for checkers,
//! `/api/portal/auth` for customers). Calls made before a session exists are
//! sent without 401 recovery: a 401 there means bad credentials.

use std::sync::Arc;

use ferry_core::{AppKind, Customer, LoginResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::client::HttpClient;
use crate::error::ApiError;
use crate::transport::ApiRequest;

/// Response of `POST /api/portal/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub email: String,
}

/// Fields to change in `PUT /api/portal/auth/profile`. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<HttpClient>,
}

impl AuthService {
    #[must_use]
    pub const fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    fn path(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.client.app().auth_prefix())
    }

    fn require_customer(&self, operation: &str) -> Result<(), ApiError> {
        if self.client.app() == AppKind::Customer {
            Ok(())
        } else {
            Err(ApiError::Validation(format!(
                "{operation} is only available in the customer app"
            )))
        }
    }

    /// Exchange credentials for a session, persisting both tokens and the
    /// returned profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] for rejected credentials, or a storage
    /// error if the session cannot be persisted.
    pub async fn login<U>(&self, email: &str, password: &str) -> Result<LoginResponse<U>, ApiError>
    where
        U: DeserializeOwned + Serialize,
    {
        let request = ApiRequest::post(self.path("mobile-login"))
            .json(&json!({ "email": email, "password": password }))?
            .without_auth_refresh();
        let response: LoginResponse<U> = self.client.execute_json(request).await?;

        let storage = self.client.storage();
        storage.set_tokens(&response.access_token, &response.refresh_token)?;
        storage.set_profile(&response.user)?;
        tracing::info!(app = %self.client.app(), "logged in");
        Ok(response)
    }

    /// Exchange a Google identity for a portal session, creating the customer
    /// on first use. Persists tokens and profile like [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] outside the customer app, otherwise
    /// the server's answer or a storage error.
    pub async fn google_sign_in(
        &self,
        google_id: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<LoginResponse<Customer>, ApiError> {
        self.require_customer("google_sign_in")?;
        let request = ApiRequest::post(self.path("google-signin"))
            .json(&json!({
                "google_id": google_id,
                "email": email,
                "first_name": first_name,
                "last_name": last_name,
            }))?
            .without_auth_refresh();
        let response: LoginResponse<Customer> = self.client.execute_json(request).await?;

        let storage = self.client.storage();
        storage.set_tokens(&response.access_token, &response.refresh_token)?;
        storage.set_profile(&response.user)?;
        tracing::info!(app = %self.client.app(), "signed in with Google");
        Ok(response)
    }

    /// Tell the server to revoke the refresh token, then forget the session
    /// locally whatever the server said.
    ///
    /// # Errors
    ///
    /// Returns a storage error only if local state cannot be cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let storage = self.client.storage();
        match storage.refresh_token() {
            Ok(Some(refresh_token)) => {
                let request = ApiRequest::post(self.path("logout"))
                    .json(&json!({ "refresh_token": refresh_token }))?
                    .without_auth_refresh();
                if let Err(error) = self.client.execute(request).await {
                    tracing::debug!(%error, "server logout failed; clearing local session anyway");
                }
            }
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "could not read refresh token for logout"),
        }
        storage.clear_all()?;
        tracing::info!(app = %self.client.app(), "logged out");
        Ok(())
    }

    /// `GET {prefix}/me`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] from the request pipeline.
    pub async fn profile<U: DeserializeOwned>(&self) -> Result<U, ApiError> {
        self.client.get_json(&self.path("me")).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] outside the customer app, otherwise
    /// the server's answer.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        mobile: &str,
    ) -> Result<RegisterResponse, ApiError> {
        self.require_customer("register")?;
        let request = ApiRequest::post(self.path("register"))
            .json(&json!({
                "first_name": first_name,
                "last_name": last_name,
                "email": email,
                "password": password,
                "mobile": mobile,
            }))?
            .without_auth_refresh();
        self.client.execute_json(request).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] outside the customer app, otherwise
    /// the server's answer.
    pub async fn verify_email(&self, email: &str, otp: &str) -> Result<(), ApiError> {
        self.require_customer("verify_email")?;
        self.send_unauthenticated("verify-email", &json!({ "email": email, "otp": otp }))
            .await
    }

    /// `purpose` is `registration` or `password_reset`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] outside the customer app, otherwise
    /// the server's answer.
    pub async fn resend_otp(&self, email: &str, purpose: &str) -> Result<(), ApiError> {
        self.require_customer("resend_otp")?;
        let request = ApiRequest::post(self.path("resend-otp"))
            .query("purpose", purpose)
            .json(&json!({ "email": email }))?
            .without_auth_refresh();
        self.client.execute(request).await.map(|_| ())
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] outside the customer app, otherwise
    /// the server's answer.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        self.require_customer("forgot_password")?;
        self.send_unauthenticated("forgot-password", &json!({ "email": email }))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] outside the customer app, otherwise
    /// the server's answer.
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        self.require_customer("reset_password")?;
        self.send_unauthenticated(
            "reset-password",
            &json!({ "email": email, "otp": otp, "new_password": new_password }),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] outside the customer app, otherwise
    /// the server's answer.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        self.require_customer("change_password")?;
        let request = ApiRequest::post(self.path("change-password")).json(&json!({
            "old_password": old_password,
            "new_password": new_password,
        }))?;
        self.client.execute(request).await.map(|_| ())
    }

    /// Update the customer profile and re-cache it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] outside the customer app, otherwise
    /// the server's answer or a storage error.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Customer, ApiError> {
        self.require_customer("update_profile")?;
        let request = ApiRequest::put(self.path("profile")).json(update)?;
        let customer: Customer = self.client.execute_json(request).await?;
        self.client.storage().set_profile(&customer)?;
        Ok(customer)
    }

    async fn send_unauthenticated(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post(self.path(endpoint))
            .json(body)?
            .without_auth_refresh();
        self.client.execute(request).await.map(|_| ())
    }
}
