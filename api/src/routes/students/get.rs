use axum::{Extension, extract::{Path, State}, response::Response};

use crate::auth::claims::ApiUser;
use crate::routes::common::{ok, service_error_response};
use crate::state::AppState;

/// GET /api/students/{course_id}
///
/// The current roster of the course's stage, ordered by full name, each
/// entry carrying its live unpaid flag — what the scanning device shows
/// before a session starts. Only the course's assigned lecturer may fetch
/// it.
pub async fn course_roster(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Extension(ApiUser(caller)): Extension<ApiUser>,
) -> Response {
    match services::students::course_roster(state.db(), caller.id, course_id).await {
        Ok(roster) => ok(roster, "Students retrieved"),
        Err(e) => service_error_response(e),
    }
}
