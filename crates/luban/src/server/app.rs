//! Application content endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use entries::AppId;
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::apps::{LoadType, SaveOp};
use crate::server::error::{ApiEnvelope, ApiError, ApiOk};
use crate::server::ServerState;
use crate::service::CurrentUser;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoadAppQuery {
    pub app_id: AppId,
    /// `view`, `preview` or `edit`.
    pub load_type: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SaveAppQuery {
    pub app_id: AppId,
    /// `save` or `publish`.
    pub op: String,
}

#[utoipa::path(
    get,
    path = "/app",
    tag = "apps",
    params(LoadAppQuery),
    responses(
        (status = 200, body = ApiEnvelope, description = "stored content, null when never saved"),
        (status = 401, body = ApiEnvelope),
    )
)]
pub(crate) async fn load_app(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    query: Result<Query<LoadAppQuery>, QueryRejection>,
) -> Result<ApiOk<Option<Value>>, ApiError> {
    let Query(query) = query?;
    let load = LoadType::parse(&query.load_type)?;
    let content = state.service.load_app(&user, query.app_id, load).await?;
    Ok(ApiOk(content))
}

#[utoipa::path(
    post,
    path = "/app",
    tag = "apps",
    params(SaveAppQuery),
    responses(
        (status = 200, body = ApiEnvelope),
        (status = 401, body = ApiEnvelope),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn save_app(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    query: Result<Query<SaveAppQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiOk<()>, ApiError> {
    let Query(query) = query?;
    let op = SaveOp::parse(&query.op)?;
    let Json(content) = body?;
    state
        .service
        .save_app(&user, query.app_id, op, content)
        .await?;
    Ok(ApiOk(()))
}
