//! Entry tree endpoints for the current user.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use entries::{Entry, NewEntry, NewEntryKind};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::CoreError;
use crate::server::error::{ApiEnvelope, ApiError, ApiOk};
use crate::server::ServerState;
use crate::service::{CurrentUser, UserProfile};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEntriesQuery {
    /// Directory to list, such as `/a/b/`. The root when omitted.
    pub dir: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EntryPayload {
    pub name: String,
    /// `directory` or `application`, case-insensitive.
    #[serde(rename = "type")]
    pub entry_type: String,
    pub comment: String,
    pub icon: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateEntryRequest {
    pub dir: String,
    pub entry: EntryPayload,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteEntryRequest {
    pub dir: String,
    pub entry_name: String,
}

#[utoipa::path(
    get,
    path = "/currentUser",
    tag = "entries",
    responses(
        (status = 200, body = ApiEnvelope, description = "username, avatarUrl and rootDir"),
        (status = 401, body = ApiEnvelope),
        (status = 500, body = ApiEnvelope),
    )
)]
pub(crate) async fn current_user(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
) -> Result<ApiOk<UserProfile>, ApiError> {
    Ok(ApiOk(state.service.profile(&user).await?))
}

#[utoipa::path(
    get,
    path = "/currentUser/entry",
    tag = "entries",
    params(ListEntriesQuery),
    responses(
        (status = 200, body = ApiEnvelope, description = "children of the directory"),
        (status = 401, body = ApiEnvelope),
    )
)]
pub(crate) async fn list_entries(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    query: Result<Query<ListEntriesQuery>, QueryRejection>,
) -> Result<ApiOk<Vec<Entry>>, ApiError> {
    let Query(query) = query?;
    let dir = query.dir.as_deref().unwrap_or("/");
    Ok(ApiOk(state.service.list_directory(&user, dir).await?))
}

#[utoipa::path(
    post,
    path = "/currentUser/entry",
    tag = "entries",
    request_body = CreateEntryRequest,
    responses(
        (status = 200, body = ApiEnvelope, description = "the created entry"),
        (status = 401, body = ApiEnvelope),
        (status = 500, body = ApiEnvelope),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn create_entry(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Result<ApiOk<Entry>, ApiError> {
    let Json(payload) = payload?;
    let kind = NewEntryKind::parse("entry.type", &payload.entry.entry_type)
        .map_err(CoreError::from)?;
    let entry = NewEntry {
        name: payload.entry.name,
        kind,
        comment: payload.entry.comment,
        icon: payload.entry.icon,
    };
    let created = state
        .service
        .create_entry(&user, &payload.dir, entry)
        .await?;
    Ok(ApiOk(created))
}

#[utoipa::path(
    delete,
    path = "/currentUser/entry",
    tag = "entries",
    request_body = DeleteEntryRequest,
    responses(
        (status = 200, body = ApiEnvelope),
        (status = 401, body = ApiEnvelope),
        (status = 500, body = ApiEnvelope),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn delete_entry(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    payload: Result<Json<DeleteEntryRequest>, JsonRejection>,
) -> Result<ApiOk<()>, ApiError> {
    let Json(payload) = payload?;
    state
        .service
        .delete_entry(&user, &payload.dir, &payload.entry_name)
        .await?;
    Ok(ApiOk(()))
}
