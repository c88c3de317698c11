//! JWT authentication for the admin API.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AdminState;

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (operator name)
    pub exp: usize,  // Expiration time
    pub iat: usize,  // Issued at
}

/// Generate an admin token signed with `secret`.
pub fn generate_token(secret: &str, subject: &str, ttl_hours: i64) -> Result<String, String> {
    if secret.is_empty() {
        return Err("admin.jwt_secret is not configured".to_string());
    }
    let now = chrono::Utc::now();
    let exp = now + chrono::Duration::hours(ttl_hours.max(1));

    let claims = Claims {
        sub: subject.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

/// Validate a token against `secret`.
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, String> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| e.to_string())?;

    Ok(token_data.claims)
}

/// Extract token from Authorization header.
pub fn extract_token(auth_header: Option<&str>) -> Result<&str, String> {
    let header = auth_header.ok_or("Missing Authorization header")?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Invalid Authorization header format".to_string())
}

/// Reject requests without a valid bearer token.
pub async fn require_admin(
    State(state): State<AdminState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let claims = extract_token(header)
        .and_then(|token| validate_token(&state.jwt_secret, token))
        .map_err(|e| {
            tracing::warn!("Rejected admin request to {}: {}", request.uri().path(), e);
            StatusCode::UNAUTHORIZED
        })?;

    tracing::debug!("Admin request by {} to {}", claims.sub, request.uri().path());
    Ok(next.run(request).await)
}
