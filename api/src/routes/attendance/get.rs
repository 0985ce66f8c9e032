use axum::{Extension, extract::{Path, State}, response::Response};

use crate::auth::claims::ApiUser;
use crate::routes::common::{ok, service_error_response};
use crate::state::AppState;

/// GET /api/attendance/sessions/{lecturer_id}
///
/// A lecturer's own sessions, newest session date first, with present,
/// absent and total counts computed from records. Self-service only: asking
/// for another lecturer's sessions is a 403.
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(lecturer_id): Path<i64>,
    Extension(ApiUser(caller)): Extension<ApiUser>,
) -> Response {
    match services::attendance::list_sessions(state.db(), lecturer_id, caller.id).await {
        Ok(sessions) => ok(sessions, "Sessions retrieved"),
        Err(e) => service_error_response(e),
    }
}

/// GET /api/attendance/session/{session_id}/records
///
/// The per-student records of one session, present students first, then
/// alphabetical by student id; display names fall back to "Unknown" for
/// students deleted since the upload. Only the session's lecturer may read
/// them.
pub async fn session_records(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Extension(ApiUser(caller)): Extension<ApiUser>,
) -> Response {
    match services::attendance::session_records(state.db(), session_id, caller.id).await {
        Ok(records) => ok(records, "Session records retrieved"),
        Err(e) => service_error_response(e),
    }
}
