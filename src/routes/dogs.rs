use crate::error::ApiError;
use crate::models::{NewDogRequest, RatingResponse, RatingStatus};
use crate::routes::{AppState, AuthenticatedUser};
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure dog routes
///
/// Status segments are restricted to `liked|disliked|undecided` and the
/// blacklist segment to `true|false`; anything else does not route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/dog/add/", web::post().to(add_dog))
        .route(
            "/dog/{cursor:-?\\d+}/{status:liked|disliked|undecided}/next/",
            web::get().to(next_dog),
        )
        .route(
            "/dog/{dog_id:\\d+}/blacklist/{blacklisted:true|false}/",
            web::get().to(set_blacklist),
        )
        .route(
            "/dog/{dog_id:\\d+}/blacklist/{blacklisted:true|false}/",
            web::put().to(set_blacklist),
        )
        .route(
            "/dog/{dog_id:\\d+}/{status:liked|disliked|undecided}/",
            web::get().to(set_status),
        )
        .route(
            "/dog/{dog_id:\\d+}/{status:liked|disliked|undecided}/",
            web::put().to(set_status),
        )
        .route("/dog/{dog_id:\\d+}/delete/", web::delete().to(delete_dog))
        .route("/dog/{dog_id:\\d+}/", web::get().to(get_dog));
}

/// Next dog in a rating bucket
///
/// GET /api/dog/{cursor}/{status}/next/
///
/// `cursor` is the id of the last dog shown, or -1 to start over.
async fn next_dog(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(i64, RatingStatus)>,
) -> Result<HttpResponse, ApiError> {
    let (cursor, bucket) = path.into_inner();

    let dog = state.selector.next_dog(user.id, bucket, cursor).await?;

    tracing::debug!("Next {} dog for {} after {}: {}", bucket, user.username, cursor, dog);

    Ok(HttpResponse::Ok().json(dog))
}

/// Rate a dog
///
/// GET|PUT /api/dog/{dog_id}/{status}/
async fn set_status(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(i64, RatingStatus)>,
) -> Result<HttpResponse, ApiError> {
    let (dog_id, status) = path.into_inner();

    let rating = state.store.upsert_status(user.id, dog_id, status).await?;

    tracing::info!("{} marked dog {} as {}", user.username, dog_id, status);

    Ok(HttpResponse::Ok().json(RatingResponse::from(rating)))
}

/// Blacklist or restore a dog
///
/// GET|PUT /api/dog/{dog_id}/blacklist/{true|false}/
async fn set_blacklist(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(i64, bool)>,
) -> Result<HttpResponse, ApiError> {
    let (dog_id, blacklisted) = path.into_inner();

    let rating = state
        .store
        .upsert_blacklist(user.id, dog_id, blacklisted)
        .await?;

    tracing::info!(
        "{} set blacklist={} on dog {}",
        user.username,
        blacklisted,
        dog_id
    );

    Ok(HttpResponse::Ok().json(RatingResponse::from(rating)))
}

/// Add a dog
///
/// POST /api/dog/add/
async fn add_dog(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<NewDogRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let new_dog = req
        .to_new_dog()
        .ok_or_else(|| ApiError::BadRequest("Invalid gender or size".to_string()))?;

    let dog = state.store.insert_dog(new_dog).await?;

    tracing::info!("{} added dog {}", user.username, dog);

    Ok(HttpResponse::Created().json(dog))
}

/// Read a single dog
///
/// GET /api/dog/{dog_id}/
async fn get_dog(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let dog_id = path.into_inner();

    match state.store.get_dog(dog_id).await? {
        Some(dog) => Ok(HttpResponse::Ok().json(dog)),
        None => Err(ApiError::NotFound(format!("Dog {} not found", dog_id))),
    }
}

/// Delete a dog
///
/// DELETE /api/dog/{dog_id}/delete/
async fn delete_dog(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let dog_id = path.into_inner();

    if !state.store.delete_dog(dog_id).await? {
        return Err(ApiError::NotFound(format!("Dog {} not found", dog_id)));
    }

    tracing::info!("{} deleted dog {}", user.username, dog_id);

    Ok(HttpResponse::NoContent().finish())
}
