use crate::error::ApiError;
use crate::models::{
    LoginRequest, LoginResponse, PreferenceFields, PreferenceResponse, PreferencesRequest,
    RegisterRequest, RegisterResponse,
};
use crate::routes::{AppState, AuthenticatedUser};
use crate::services::{AuthError, StoreError};
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure user and preference routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/user/", web::post().to(register))
        .route("/user/login/", web::post().to(login))
        .route("/user/preferences/", web::get().to(get_preferences))
        .route("/user/preferences/", web::put().to(update_preferences));
}

/// Register a user
///
/// POST /api/user/
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let user = match state
        .auth
        .register(state.store.as_ref(), req.username.trim(), &req.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::Store(StoreError::Conflict(_))) => {
            return Err(ApiError::field(
                "username",
                "A user with that username already exists.",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Created().json(RegisterResponse {
        username: user.username,
    }))
}

/// Exchange credentials for a token
///
/// POST /api/user/login/
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let token = state
        .auth
        .login(state.store.as_ref(), req.username.trim(), &req.password)
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// Read the user's preferences, creating the defaults on first access
///
/// GET /api/user/preferences/
async fn get_preferences(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let preference = state
        .store
        .get_or_create_preference(user.id, &PreferenceFields::default())
        .await?;

    Ok(HttpResponse::Ok().json(PreferenceResponse::from(preference)))
}

/// Replace the user's preferences
///
/// PUT /api/user/preferences/
///
/// Request body:
/// ```json
/// { "age": "b,y", "gender": "m,f", "size": "s,m", "microchipped": "e" }
/// ```
async fn update_preferences(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<PreferencesRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let fields = req.normalized()?;

    let preference = state.store.upsert_preference(user.id, &fields).await?;

    tracing::info!(
        "Preferences for {}: age={} gender={} size={} microchipped={}",
        user.username,
        preference.age,
        preference.gender,
        preference.size,
        preference.microchipped.code()
    );

    Ok(HttpResponse::Ok().json(PreferenceResponse::from(preference)))
}
