//! Explicit authorization predicates: `(caller, resource) -> allow | deny`.
//!
//! Route-level guards only establish identity and coarse role; every
//! resource-level decision goes through one of these functions so the rules
//! stay independent of the request pipeline.

use db::models::{attendance_session, course};

use crate::error::ServiceError;

/// The caller must be the lecturer assigned to the course. A course with no
/// assigned lecturer denies everyone.
pub fn require_course_lecturer(
    course: &course::Model,
    caller_id: i64,
) -> Result<(), ServiceError> {
    match course.lecturer_id {
        Some(id) if id == caller_id => Ok(()),
        _ => Err(ServiceError::forbidden(
            "You are not the lecturer assigned to this course.",
        )),
    }
}

/// The caller must be the lecturer who uploaded the session.
pub fn require_session_lecturer(
    session: &attendance_session::Model,
    caller_id: i64,
) -> Result<(), ServiceError> {
    if session.lecturer_id == caller_id {
        Ok(())
    } else {
        Err(ServiceError::forbidden(
            "You are not the lecturer who owns this session.",
        ))
    }
}

/// Self-service check: lecturers may only query their own data.
pub fn require_self(lecturer_id: i64, caller_id: i64) -> Result<(), ServiceError> {
    if lecturer_id == caller_id {
        Ok(())
    } else {
        Err(ServiceError::forbidden(
            "Lecturers may only access their own sessions.",
        ))
    }
}

/// Department scoping. A resource outside the caller's department reads as
/// missing rather than forbidden, so cross-department probing cannot confirm
/// existence.
pub fn require_in_department(
    resource_department_id: i64,
    department_id: i64,
    what: &str,
) -> Result<(), ServiceError> {
    if resource_department_id == department_id {
        Ok(())
    } else {
        Err(ServiceError::not_found(format!("{what} not found.")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn course(lecturer_id: Option<i64>) -> course::Model {
        course::Model {
            id: 1,
            stage_id: 1,
            name: "Databases".into(),
            code: "DB201".into(),
            lecturer_id,
        }
    }

    fn session(lecturer_id: i64) -> attendance_session::Model {
        attendance_session::Model {
            id: 9,
            course_id: 1,
            lecturer_id,
            session_date: Utc::now(),
            started_at: Utc::now(),
            ended_at: Utc::now(),
            total_scanned: 0,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn course_lecturer_matches() {
        assert!(require_course_lecturer(&course(Some(7)), 7).is_ok());
        assert!(matches!(
            require_course_lecturer(&course(Some(7)), 8),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            require_course_lecturer(&course(None), 7),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn session_owner_only() {
        assert!(require_session_lecturer(&session(3), 3).is_ok());
        assert!(matches!(
            require_session_lecturer(&session(3), 4),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn cross_department_reads_as_missing() {
        assert!(require_in_department(5, 5, "Course").is_ok());
        assert!(matches!(
            require_in_department(5, 6, "Course"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
