use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::services::AuthUser;
use crate::error::ApiError;
use crate::profiles::dto::{MeResponse, SetRoleRequest, UserListItem};
use crate::profiles::repo::Profile;
use crate::profiles::resolver::{self, Role};
use crate::state::AppState;

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/role", put(set_role))
        .route("/users/:id", delete(delete_user))
}

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let identity = resolver::resolve(&state, claims).await;
    let profile = Profile::find_by_id(&state.db, claims.sub).await?;

    // The resolver may have just materialized the row; fall back to the
    // claims if even that failed.
    let (full_name, phone_number, email) = match profile {
        Some(p) => (p.full_name, p.phone_number, p.email),
        None => (String::new(), String::new(), claims.email.clone()),
    };

    Ok(Json(MeResponse {
        id: claims.sub,
        email,
        full_name,
        phone_number,
        role: identity.role,
        is_admin: identity.is_admin,
        is_worker: identity.is_worker,
        is_head: identity.is_head,
        email_verified: identity.email_verified,
    }))
}

#[instrument(skip(state, claims))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
) -> Result<Json<Vec<UserListItem>>, ApiError> {
    require_admin(&state, claims).await?;

    let users = Profile::list_all(&state.db).await?;
    let items = users
        .into_iter()
        .map(|p| UserListItem {
            id: p.id,
            email: p.email,
            full_name: p.full_name,
            phone_number: p.phone_number,
            role: Role::parse(&p.role),
            email_verified: p.email_verified,
            created_at: p.created_at,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, claims, body))]
pub async fn set_role(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SetRoleRequest>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, claims).await?;

    let updated = Profile::set_role(&state.db, id, body.role.as_str()).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %id, role = body.role.as_str(), "role changed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, claims))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(ref claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, claims).await?;

    let deleted = Profile::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn require_admin(
    state: &AppState,
    claims: &crate::auth::services::Claims,
) -> Result<(), ApiError> {
    let identity = resolver::resolve(state, claims).await;
    if !identity.is_admin {
        return Err(ApiError::Forbidden("Admin role required".into()));
    }
    Ok(())
}
