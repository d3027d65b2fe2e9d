//! Bearer token authentication middleware.
//!
//! Tokens are JWTs issued by the external identity provider and signed
//! with a shared HS256 secret. The `sub` claim is the user id.
//!
//! Requests without an `Authorization` header are served as anonymous
//! callers: they can read global data but cannot create anything. A
//! header that is present but invalid is always rejected.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use freshsaver_models::GLOBAL_SCOPE;

use crate::config::AuthConfig;
use crate::identity::Caller;
use crate::{error::Error, AppState};

/// Claims read from identity tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Expiry (seconds since epoch)
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Extract the bearer token from the Authorization header.
///
/// Returns `Ok(None)` when the header is absent and an error when it is
/// present but not a bearer token.
fn extract_bearer(req: &Request<Body>) -> Result<Option<String>, Error> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| Error::InvalidToken)?;
    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim().to_string()))
        .ok_or(Error::InvalidToken)
}

/// Verify a token and return the caller it identifies.
pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<Caller, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = &auth.jwt_issuer {
        validation.set_issuer(&[issuer]);
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => Error::TokenExpired,
        _ => Error::InvalidToken,
    })?;

    if data.claims.sub.trim().is_empty() {
        return Err(Error::InvalidToken);
    }

    // The shared scope tag is not a user
    if data.claims.sub == GLOBAL_SCOPE {
        warn!("Rejected token whose subject is the global scope");
        return Err(Error::InvalidToken);
    }

    Ok(Caller::user(data.claims.sub))
}

/// Middleware that resolves the caller and injects it into request
/// extensions.
///
/// # Errors
///
/// Returns 401 Unauthorized if an Authorization header is present and:
/// - it is not a Bearer token
/// - the signature, issuer or expiry do not verify
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use freshsaver::middleware::identify_caller;
///
/// let app = Router::new()
///     .route("/categories", get(list_categories))
///     .layer(middleware::from_fn_with_state(state.clone(), identify_caller));
/// ```
pub async fn identify_caller(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Error> {
    let caller = match extract_bearer(&req)? {
        Some(token) => verify_token(&state.auth, &token)?,
        None => Caller::anonymous(),
    };

    debug!(user_id = ?caller.user_id(), "Resolved caller");

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn auth(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: issuer.map(str::to_string),
        }
    }

    fn token(secret: &str, sub: &str, exp_offset: i64, iss: Option<&str>) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            iss: iss.map(str::to_string),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let caller = verify_token(&auth(None), &token("test-secret", "u1", 3600, None)).unwrap();
        assert_eq!(caller.user_id(), Some("u1"));
    }

    #[test]
    fn test_wrong_secret() {
        let err = verify_token(&auth(None), &token("other", "u1", 3600, None)).unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[test]
    fn test_expired_token() {
        let err = verify_token(&auth(None), &token("test-secret", "u1", -3600, None)).unwrap_err();
        assert!(matches!(err, Error::TokenExpired));
    }

    #[test]
    fn test_issuer_is_enforced() {
        let config = auth(Some("https://id.example"));
        assert!(verify_token(&config, &token("test-secret", "u1", 3600, None)).is_err());
        assert!(verify_token(
            &config,
            &token("test-secret", "u1", 3600, Some("https://id.example"))
        )
        .is_ok());
    }

    #[test]
    fn test_global_subject_rejected() {
        let err = verify_token(&auth(None), &token("test-secret", "global", 3600, None)).unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let err = verify_token(&auth(None), &token("test-secret", " ", 3600, None)).unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }
}
