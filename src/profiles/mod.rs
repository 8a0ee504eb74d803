mod dto;
pub mod handlers;
pub mod repo;
pub mod resolver;

pub use resolver::{resolve, ResolvedIdentity, Role};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::me_routes())
        .merge(handlers::admin_routes())
}
