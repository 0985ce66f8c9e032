//! Attendance reconciliation and reporting.
//!
//! `upload_session` turns a lecturer's batched scan list into an immutable
//! session snapshot: the session row is persisted first with the raw scan
//! count, then the stage roster and the department's unpaid registry are
//! read once each, and one record per roster student is written in a single
//! batch. Scans for students not on the roster are dropped, not fatal —
//! barcode readers produce noise and a stray read must not void a session.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};

use db::models::{attendance_record, attendance_session, course, stage, student, unpaid_student};

use crate::authz;
use crate::error::ServiceError;

/// One barcode read as received from the device.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanEntry {
    pub student_id: String,
    pub scanned_at: DateTime<Utc>,
}

/// Input to `upload_session`.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub course_id: i64,
    pub session_date: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub scans: Vec<ScanEntry>,
}

/// Outcome of a reconciled upload.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: i64,
    pub total_students: i64,
    pub present_count: i64,
    pub absent_count: i64,
}

/// A session annotated with counts derived from its records (the session's
/// own `total_scanned` is the raw device count and is not used here).
#[derive(Debug, Clone, Serialize)]
pub struct SessionWithCounts {
    #[serde(flatten)]
    pub session: attendance_session::Model,
    pub course_name: String,
    pub course_code: String,
    pub total_students: i64,
    pub present_count: i64,
    pub absent_count: i64,
}

/// One record joined with the student's display name.
#[derive(Debug, Clone, Serialize)]
pub struct RecordDetail {
    pub student_id: String,
    pub full_name: String,
    pub is_present: bool,
    pub is_unpaid: bool,
    pub scanned_at: DateTime<Utc>,
}

/// A session with full record detail, as shown on department reports.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    #[serde(flatten)]
    pub session: attendance_session::Model,
    pub total_students: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub records: Vec<RecordDetail>,
}

/// Reconciles a scan list against the course's current roster and persists
/// the session with one record per roster student.
///
/// Ordering is deliberate: the session row (with `total_scanned` =
/// `scans.len()`) commits before any reconciliation, so the raw count
/// survives even when every scan is discarded. There is no transaction
/// spanning the two phases; a crash in between leaves a zero-record session
/// that [`find_orphaned_sessions`] can surface.
pub async fn upload_session(
    db: &DatabaseConnection,
    caller_id: i64,
    input: UploadSession,
) -> Result<SessionSummary, ServiceError> {
    let course = course::Entity::find_by_id(input.course_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course not found."))?;

    if course.lecturer_id.is_none() {
        return Err(ServiceError::invalid_input(
            "No lecturer assigned to this course.",
        ));
    }
    authz::require_course_lecturer(&course, caller_id)?;

    let stage = stage::Entity::find_by_id(course.stage_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Stage not found for this course."))?;

    // Phase one: the session row, carrying the raw scan count.
    let session = attendance_session::ActiveModel {
        id: NotSet,
        course_id: Set(course.id),
        lecturer_id: Set(caller_id),
        session_date: Set(input.session_date),
        started_at: Set(input.started_at),
        ended_at: Set(input.ended_at),
        total_scanned: Set(input.scans.len() as i32),
        uploaded_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    // Moment-of-truth reads: the roster and the unpaid registry, each once.
    let roster: Vec<String> = student::Entity::find()
        .filter(student::Column::StageId.eq(stage.id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.student_id)
        .collect();
    let roster_set: HashSet<&str> = roster.iter().map(String::as_str).collect();

    let unpaid: HashSet<String> = unpaid_student::Entity::find()
        .filter(unpaid_student::Column::DepartmentId.eq(stage.department_id))
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.student_id)
        .collect();

    // Deduplicate valid scans by student; the first scan keeps its timestamp.
    let mut scanned: HashMap<String, DateTime<Utc>> = HashMap::new();
    for scan in &input.scans {
        if !roster_set.contains(scan.student_id.as_str()) {
            tracing::debug!(
                session_id = session.id,
                student_id = %scan.student_id,
                "discarding scan for student not on the roster"
            );
            continue;
        }
        scanned
            .entry(scan.student_id.clone())
            .or_insert(scan.scanned_at);
    }

    // Phase two: one record per roster student, written in a single batch.
    // Absentees get ended_at as a placeholder timestamp.
    let records: Vec<attendance_record::ActiveModel> = roster
        .iter()
        .map(|student_id| {
            let (is_present, scanned_at) = match scanned.get(student_id) {
                Some(at) => (true, *at),
                None => (false, input.ended_at),
            };
            attendance_record::ActiveModel {
                id: NotSet,
                session_id: Set(session.id),
                student_id: Set(student_id.clone()),
                scanned_at: Set(scanned_at),
                is_present: Set(is_present),
                is_unpaid: Set(unpaid.contains(student_id)),
            }
        })
        .collect();

    if !records.is_empty() {
        attendance_record::Entity::insert_many(records).exec(db).await?;
    }

    let total_students = roster.len() as i64;
    let present_count = scanned.len() as i64;

    tracing::info!(
        session_id = session.id,
        course_id = course.id,
        total_students,
        present_count,
        total_scanned = session.total_scanned,
        "attendance session uploaded"
    );

    Ok(SessionSummary {
        session_id: session.id,
        total_students,
        present_count,
        absent_count: total_students - present_count,
    })
}

/// Lists a lecturer's own sessions, newest session date first, with counts
/// aggregated from records in one grouped pass (no per-session queries).
pub async fn list_sessions(
    db: &DatabaseConnection,
    lecturer_id: i64,
    caller_id: i64,
) -> Result<Vec<SessionWithCounts>, ServiceError> {
    authz::require_self(lecturer_id, caller_id)?;

    let sessions = attendance_session::Entity::find()
        .filter(attendance_session::Column::LecturerId.eq(lecturer_id))
        .order_by_desc(attendance_session::Column::SessionDate)
        .all(db)
        .await?;

    let course_ids: Vec<i64> = {
        let mut ids: Vec<i64> = sessions.iter().map(|s| s.course_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let courses: HashMap<i64, (String, String)> = if course_ids.is_empty() {
        HashMap::new()
    } else {
        course::Entity::find()
            .filter(course::Column::Id.is_in(course_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, (c.name, c.code)))
            .collect()
    };

    let session_ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let counts = record_counts_for(db, &session_ids).await?;

    Ok(sessions
        .into_iter()
        .map(|session| {
            let (present, absent) = counts.get(&session.id).copied().unwrap_or((0, 0));
            let (course_name, course_code) = courses
                .get(&session.course_id)
                .cloned()
                .unwrap_or_else(|| ("Unknown".into(), "Unknown".into()));
            SessionWithCounts {
                course_name,
                course_code,
                total_students: present + absent,
                present_count: present,
                absent_count: absent,
                session,
            }
        })
        .collect())
}

/// Returns a session's records joined with display names, present students
/// first and alphabetical by student id within each group.
pub async fn session_records(
    db: &DatabaseConnection,
    session_id: i64,
    caller_id: i64,
) -> Result<Vec<RecordDetail>, ServiceError> {
    let session = attendance_session::Entity::find_by_id(session_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session not found."))?;

    authz::require_session_lecturer(&session, caller_id)?;

    let records = attendance_record::Entity::find()
        .filter(attendance_record::Column::SessionId.eq(session_id))
        .all(db)
        .await?;

    to_record_details(db, records).await
}

/// Department-level reporting: `None` course means "nothing selected yet"
/// and yields an empty result for the UI to prompt on. Otherwise the
/// course's sessions, newest first, each with counts and full record detail.
pub async fn department_reports(
    db: &DatabaseConnection,
    department_id: i64,
    course_id: Option<i64>,
) -> Result<Vec<SessionReport>, ServiceError> {
    let Some(course_id) = course_id else {
        return Ok(Vec::new());
    };

    let course = course::Entity::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course not found."))?;
    let stage = stage::Entity::find_by_id(course.stage_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Stage not found for this course."))?;
    authz::require_in_department(stage.department_id, department_id, "Course")?;

    let sessions = attendance_session::Entity::find()
        .filter(attendance_session::Column::CourseId.eq(course_id))
        .order_by_desc(attendance_session::Column::SessionDate)
        .all(db)
        .await?;
    if sessions.is_empty() {
        return Ok(Vec::new());
    }

    // All records for the listed sessions in one query, grouped in memory.
    let session_ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let all_records = attendance_record::Entity::find()
        .filter(attendance_record::Column::SessionId.is_in(session_ids))
        .all(db)
        .await?;

    let names = student_names_for(db, &all_records).await?;

    let mut grouped: HashMap<i64, Vec<attendance_record::Model>> = HashMap::new();
    for record in all_records {
        grouped.entry(record.session_id).or_default().push(record);
    }

    Ok(sessions
        .into_iter()
        .map(|session| {
            let records = grouped.remove(&session.id).unwrap_or_default();
            let present = records.iter().filter(|r| r.is_present).count() as i64;
            let total = records.len() as i64;
            SessionReport {
                total_students: total,
                present_count: present,
                absent_count: total - present,
                records: sort_and_name(records, &names),
                session,
            }
        })
        .collect())
}

/// Integrity signal, not a repair: sessions past the grace window that have
/// no records point at an upload that died between its two write phases.
pub async fn find_orphaned_sessions(
    db: &DatabaseConnection,
    grace: Duration,
) -> Result<Vec<attendance_session::Model>, ServiceError> {
    let cutoff = Utc::now() - grace;
    let stale = attendance_session::Entity::find()
        .filter(attendance_session::Column::UploadedAt.lt(cutoff))
        .all(db)
        .await?;
    if stale.is_empty() {
        return Ok(Vec::new());
    }

    let stale_ids: Vec<i64> = stale.iter().map(|s| s.id).collect();
    let with_records: HashSet<i64> = attendance_record::Entity::find()
        .select_only()
        .column(attendance_record::Column::SessionId)
        .filter(attendance_record::Column::SessionId.is_in(stale_ids))
        .distinct()
        .into_tuple::<i64>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(stale
        .into_iter()
        .filter(|s| !with_records.contains(&s.id))
        .collect())
}

/// Present/absent counts per session in a single query over the record
/// table, keyed by session id.
async fn record_counts_for(
    db: &DatabaseConnection,
    session_ids: &[i64],
) -> Result<HashMap<i64, (i64, i64)>, ServiceError> {
    if session_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, bool)> = attendance_record::Entity::find()
        .select_only()
        .column(attendance_record::Column::SessionId)
        .column(attendance_record::Column::IsPresent)
        .filter(attendance_record::Column::SessionId.is_in(session_ids.to_vec()))
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<i64, (i64, i64)> = HashMap::new();
    for (session_id, is_present) in rows {
        let entry = counts.entry(session_id).or_insert((0, 0));
        if is_present {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }
    Ok(counts)
}

async fn to_record_details(
    db: &DatabaseConnection,
    records: Vec<attendance_record::Model>,
) -> Result<Vec<RecordDetail>, ServiceError> {
    let names = student_names_for(db, &records).await?;
    Ok(sort_and_name(records, &names))
}

/// Display names for every student id in `records`, one query.
async fn student_names_for(
    db: &DatabaseConnection,
    records: &[attendance_record::Model],
) -> Result<HashMap<String, String>, ServiceError> {
    if records.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<String> = {
        let mut ids: Vec<String> = records.iter().map(|r| r.student_id.clone()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    Ok(student::Entity::find()
        .filter(student::Column::StudentId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.student_id, s.full_name))
        .collect())
}

fn sort_and_name(
    mut records: Vec<attendance_record::Model>,
    names: &HashMap<String, String>,
) -> Vec<RecordDetail> {
    // Attendees first for quick visual scanning, then by student id.
    records.sort_by(|a, b| {
        b.is_present
            .cmp(&a.is_present)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    records
        .into_iter()
        .map(|r| RecordDetail {
            full_name: names
                .get(&r.student_id)
                .cloned()
                // Student rows can be deleted after the fact; the record stays.
                .unwrap_or_else(|| "Unknown".into()),
            student_id: r.student_id,
            is_present: r.is_present,
            is_unpaid: r.is_unpaid,
            scanned_at: r.scanned_at,
        })
        .collect()
}
