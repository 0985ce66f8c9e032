use axum::{Router, routing::post};

use crate::state::AppState;

mod post;

pub use post::{login, web_login};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/web-login", post(web_login))
}
