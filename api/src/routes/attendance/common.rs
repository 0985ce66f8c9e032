use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of `POST /api/attendance/session`. `scanned_students` is optional
/// at the serde level so "list missing" can be reported as a 400 instead of
/// a deserialization rejection; an empty list is a valid all-absent
/// session.
#[derive(Debug, Deserialize)]
pub struct UploadSessionRequest {
    pub course_id: i64,
    pub session_date: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    #[serde(default)]
    pub scanned_students: Option<Vec<ScannedStudent>>,
}

#[derive(Debug, Deserialize)]
pub struct ScannedStudent {
    pub student_id: String,
    pub scanned_at: DateTime<Utc>,
}
