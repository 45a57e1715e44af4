//! Caller identity from headers set by the upstream authenticator.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::server::error::ApiError;
use crate::server::ServerState;
use crate::service::CurrentUser;

#[async_trait]
impl FromRequestParts<Arc<ServerState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerState>,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };
        let id = header(&state.config.user_id_header)
            .ok_or_else(|| ApiError::unauthenticated("missing user identity"))?;
        // the name only seeds a new record, so fall back to the id
        let name = header(&state.config.user_name_header).unwrap_or(id);
        Ok(CurrentUser::new(id, name))
    }
}
