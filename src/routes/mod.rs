// Route exports
pub mod auth;
pub mod dogs;
pub mod health;
pub mod users;

use crate::core::DogSelector;
use crate::error::{handle_json_payload_error, handle_path_error};
use crate::services::{AuthService, Store};
use actix_web::web;
use std::sync::Arc;

pub use auth::AuthenticatedUser;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Arc<AuthService>,
    pub selector: DogSelector,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth: Arc<AuthService>) -> Self {
        let selector = DogSelector::new(store.clone());
        Self {
            store,
            auth,
            selector,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::PathConfig::default().error_handler(handle_path_error))
        .service(
            web::scope("/api")
                .configure(health::configure)
                .configure(users::configure)
                .configure(dogs::configure),
        );
}
