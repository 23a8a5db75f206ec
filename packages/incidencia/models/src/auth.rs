//! Account and envelope types exposed by the API.
//!
//! No dashboard flow uses these yet; they mirror the server contract so a
//! future login screen can deserialize its responses.

use serde::{Deserialize, Serialize};

/// A dashboard user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usuario {
    /// Account identifier.
    pub id: i64,
    /// Login email.
    pub email: String,
    /// First name.
    pub nombre: String,
    /// Last name.
    pub apellido: String,
    /// Company the user belongs to.
    pub empresa: String,
    /// Role name.
    pub rol: String,
    /// Whether the account is enabled.
    pub activo: bool,
    /// Creation timestamp (ISO 8601).
    pub fecha_creacion: String,
    /// Last login timestamp (ISO 8601).
    #[serde(default)]
    pub ultimo_acceso: Option<String>,
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Payload for account registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistroRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// First name.
    pub nombre: String,
    /// Last name.
    pub apellido: String,
    /// Company the user belongs to.
    pub empresa: String,
    /// Requested role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub access_token: String,
    /// Token type, normally `"bearer"`.
    pub token_type: String,
    /// The logged-in user.
    pub usuario: Usuario,
}

/// Generic success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Payload.
    pub data: T,
    /// Optional message.
    #[serde(default)]
    pub message: Option<String>,
    /// Whether the call succeeded.
    pub success: bool,
}

/// Generic paginated envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total items across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub size: u32,
    /// Number of pages.
    pub pages: u32,
}
