use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::AuthError;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;

/// The authenticated user making a request.
///
/// Extracting this rejects the request with 401 when the `Authorization`
/// header is missing or carries an invalid token. Accepts both
/// `Token <token>` and `Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

fn token_from_header(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    } else {
        None
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = token_from_header(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token.ok_or(AuthError::MissingCredentials)?;
            let state = state
                .ok_or_else(|| ApiError::Internal("Application state not configured".to_string()))?;

            let identity = state.auth.authenticate(state.store.as_ref(), &token).await?;

            Ok(AuthenticatedUser {
                id: identity.user_id,
                username: identity.username,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_token_schemes() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Token abc.def"))
            .to_http_request();
        assert_eq!(token_from_header(&req), Some("abc.def".to_string()));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer xyz"))
            .to_http_request();
        assert_eq!(token_from_header(&req), Some("xyz".to_string()));
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(token_from_header(&req), None);

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(token_from_header(&req), None);

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Token "))
            .to_http_request();
        assert_eq!(token_from_header(&req), None);
    }
}
