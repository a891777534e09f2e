//! Authentication, registration, and session bookkeeping.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{json_field, send_json};
use crate::client::{ApiClient, RequestOptions};
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::http::{FileUpload, HttpMethod, MultipartForm, RequestBody};
use crate::session::SessionField;
use crate::types::{
    AuthenticatedUser, CurrentUser, LoginRequest, LoginResponse, RegisterAgentRequest,
    RegisterUserRequest, Role,
};

/// Outcome of a role check for a protected area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No usable token; the caller should send the user to log in.
    LoginRequired,
    /// Authenticated, but with a different role.
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST /login`. Does not touch the session; see `sign_in`.
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResponse<LoginResponse> {
        send_json(&self.client, "/login", HttpMethod::Post, credentials)
            .await
            .decode()
    }

    /// Log in and, on success, store the returned token and identity.
    pub async fn sign_in(&self, credentials: &LoginRequest) -> ApiResponse<LoginResponse> {
        let resp = self.login(credentials).await;
        if let ApiResponse::Success { data, .. } = &resp {
            self.store_auth_data(&data.token, &data.user);
            tracing::info!(user = %data.user.email, role = ?data.user.role, "signed in");
        }
        resp
    }

    pub async fn register_user(
        &self,
        user: &RegisterUserRequest,
        profile_picture: Option<FileUpload>,
    ) -> ApiResponse<Value> {
        self.register("/profile/register-user", json_field(user), profile_picture)
            .await
    }

    pub async fn register_agent(
        &self,
        agent: &RegisterAgentRequest,
        profile_picture: Option<FileUpload>,
    ) -> ApiResponse<Value> {
        self.register("/profile/register-agent", json_field(agent), profile_picture)
            .await
    }

    async fn register(
        &self,
        endpoint: &str,
        user_json: Result<String, ApiError>,
        profile_picture: Option<FileUpload>,
    ) -> ApiResponse<Value> {
        let user_json = match user_json {
            Ok(text) => text,
            Err(error) => return ApiResponse::failure(error),
        };
        let mut form = MultipartForm::new().text("user", user_json);
        if let Some(picture) = profile_picture {
            form = form.file("profilePicture", picture);
        }
        self.client
            .request(endpoint, RequestOptions::multipart(HttpMethod::Post, form))
            .await
    }

    pub async fn get_profile(&self) -> ApiResponse<Value> {
        self.client.request("/profile", RequestOptions::get()).await
    }

    /// `POST /send-reset-otp` with a URL-encoded `email` field.
    pub async fn send_reset_otp(&self, email: &str) -> ApiResponse<Value> {
        let body = match serde_urlencoded::to_string(vec![("email", email)]) {
            Ok(body) => body,
            Err(e) => return ApiResponse::failure(ApiError::Serialization(e.to_string())),
        };
        let options = RequestOptions {
            method: Some(HttpMethod::Post),
            headers: vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: RequestBody::UrlEncoded(body),
        };
        self.client.request("/send-reset-otp", options).await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> ApiResponse<Value> {
        let payload = json!({ "email": email, "otp": otp, "newPassword": new_password });
        send_json(&self.client, "/reset-password", HttpMethod::Post, &payload).await
    }

    pub async fn send_verify_otp(&self) -> ApiResponse<Value> {
        self.client
            .request("/send-otp", RequestOptions::method(HttpMethod::Post))
            .await
    }

    pub async fn verify_otp(&self, otp: &str) -> ApiResponse<Value> {
        send_json(&self.client, "/verify-otp", HttpMethod::Post, &json!({ "otp": otp })).await
    }

    pub async fn check_authentication(&self) -> ApiResponse<Value> {
        self.client
            .request("/is-authenticated", RequestOptions::get())
            .await
    }

    /// `POST /logout`; the session is cleared only if the server confirms.
    pub async fn logout(&self) -> ApiResponse<Value> {
        let resp = self
            .client
            .request("/logout", RequestOptions::method(HttpMethod::Post))
            .await;
        if resp.is_success() {
            self.clear_auth_data();
        }
        resp
    }

    /// Persist a token in the slot for `user.role` plus the identity fields.
    /// Whatever the previous sign-in left, including the other role's token,
    /// is dropped in the same write.
    pub fn store_auth_data(&self, token: &str, user: &AuthenticatedUser) {
        let token_field = match user.role {
            Role::Admin => SessionField::AdminToken,
            Role::Agent | Role::User => SessionField::UserToken,
        };
        self.client.session().replace_all(&[
            (token_field, token.to_string()),
            (SessionField::UserRole, user.role.session_value().to_string()),
            (SessionField::UserEmail, user.email.clone()),
            (SessionField::UserName, user.name.clone()),
            (SessionField::UserId, user.id.clone()),
        ]);
    }

    pub fn is_admin(&self) -> bool {
        self.current_role().as_deref() == Some(Role::Admin.session_value())
    }

    pub fn is_agent(&self) -> bool {
        self.current_role().as_deref() == Some(Role::Agent.session_value())
    }

    pub fn current_role(&self) -> Option<String> {
        self.client.session().get(SessionField::UserRole)
    }

    /// The stored identity, or `None` if any of its fields is missing.
    pub fn current_user(&self) -> Option<CurrentUser> {
        let session = self.client.session();
        Some(CurrentUser {
            id: session.get(SessionField::UserId)?,
            name: session.get(SessionField::UserName)?,
            email: session.get(SessionField::UserEmail)?,
            role: session.get(SessionField::UserRole)?,
        })
    }

    pub fn clear_auth_data(&self) {
        self.client.session().clear_all();
    }

    /// Decide whether the session may enter an area restricted to `required`.
    /// Admin areas need the admin token; other areas accept either token.
    pub fn check_access(&self, required: Role) -> Access {
        let session = self.client.session();
        let token = match required {
            Role::Admin => session.get(SessionField::AdminToken),
            Role::Agent | Role::User => session.bearer_token(),
        };
        if token.filter(|t| !t.is_empty()).is_none() {
            return Access::LoginRequired;
        }
        if self.current_role().as_deref() == Some(required.session_value()) {
            Access::Granted
        } else {
            Access::Forbidden
        }
    }
}
