use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};

use services::attendance::{ScanEntry, UploadSession};

use super::common::UploadSessionRequest;
use crate::auth::claims::ApiUser;
use crate::routes::common::{bad_request, ok, service_error_response};
use crate::state::AppState;

/// POST /api/attendance/session
///
/// Uploads one scan session for reconciliation against the course's current
/// roster. Scans for unknown student ids are dropped (scanner noise), a
/// student scanned twice counts once, and every roster student gets exactly
/// one record.
///
/// ### Responses
/// - `200 OK` — `{ session_id, total_students, present_count, absent_count }`
/// - `400 Bad Request` — malformed body, missing scan list, or no lecturer
///   assigned to the course
/// - `403 Forbidden` — caller is not the course's assigned lecturer
/// - `404 Not Found` — course does not exist
pub async fn upload_session(
    State(state): State<AppState>,
    Extension(ApiUser(caller)): Extension<ApiUser>,
    payload: Result<Json<UploadSessionRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return bad_request("Invalid session data.");
    };

    let Some(scanned) = body.scanned_students else {
        return bad_request("Invalid session data.");
    };

    let input = UploadSession {
        course_id: body.course_id,
        session_date: body.session_date,
        started_at: body.started_at,
        ended_at: body.ended_at,
        scans: scanned
            .into_iter()
            .map(|s| ScanEntry {
                student_id: s.student_id,
                scanned_at: s.scanned_at,
            })
            .collect(),
    };

    match services::attendance::upload_session(state.db(), caller.id, input).await {
        Ok(summary) => ok(summary, "Session uploaded successfully."),
        Err(e) => service_error_response(e),
    }
}
