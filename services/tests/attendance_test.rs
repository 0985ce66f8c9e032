mod common;

use chrono::{Duration, TimeZone, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use db::models::{attendance_record, attendance_session, student};
use db::test_utils::setup_test_db;
use services::attendance::{self, ScanEntry, UploadSession};
use services::error::ServiceError;

use common::{add_student, setup_campus};

fn upload_input(course_id: i64, scans: Vec<ScanEntry>) -> UploadSession {
    let date = Utc.with_ymd_and_hms(2025, 10, 6, 0, 0, 0).unwrap();
    UploadSession {
        course_id,
        session_date: date,
        started_at: date + Duration::hours(8),
        ended_at: date + Duration::hours(10),
        scans,
    }
}

fn scan(student_id: &str, minutes_in: i64) -> ScanEntry {
    let date = Utc.with_ymd_and_hms(2025, 10, 6, 8, 0, 0).unwrap();
    ScanEntry {
        student_id: student_id.to_owned(),
        scanned_at: date + Duration::minutes(minutes_in),
    }
}

/// Roster {S1, S2, S3}; scans = [S1, S9 (unknown), S1 (duplicate)].
/// Expected: total_scanned = 3 raw, one present record for S1 keeping its
/// first scan time, absents for S2 and S3 stamped with ended_at, no record
/// for S9.
#[tokio::test]
async fn reconciliation_discards_noise_and_dedupes() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    add_student(&db, campus.stage.id, campus.department.id, "S1", "Ahmed Ali").await;
    add_student(&db, campus.stage.id, campus.department.id, "S2", "Sara Hassan").await;
    add_student(&db, campus.stage.id, campus.department.id, "S3", "Omar Nasser").await;

    let input = upload_input(
        campus.course.id,
        vec![scan("S1", 5), scan("S9", 6), scan("S1", 50)],
    );
    let ended_at = input.ended_at;

    let summary = attendance::upload_session(&db, campus.lecturer.id, input)
        .await
        .expect("upload should succeed");

    assert_eq!(summary.total_students, 3);
    assert_eq!(summary.present_count, 1);
    assert_eq!(summary.absent_count, 2);

    let session = attendance_session::Entity::find_by_id(summary.session_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.total_scanned, 3);

    let records = attendance_record::Entity::find()
        .filter(attendance_record::Column::SessionId.eq(summary.session_id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(records.len(), 3, "one record per roster student");
    assert!(records.iter().all(|r| r.student_id != "S9"));

    let s1 = records.iter().find(|r| r.student_id == "S1").unwrap();
    assert!(s1.is_present);
    assert_eq!(s1.scanned_at, scan("S1", 5).scanned_at, "first scan wins");

    for absent_id in ["S2", "S3"] {
        let r = records.iter().find(|r| r.student_id == absent_id).unwrap();
        assert!(!r.is_present);
        assert_eq!(r.scanned_at, ended_at, "absentees stamped with ended_at");
    }
}

#[tokio::test]
async fn empty_scan_list_marks_everyone_absent() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    add_student(&db, campus.stage.id, campus.department.id, "S1", "Ahmed Ali").await;
    add_student(&db, campus.stage.id, campus.department.id, "S2", "Sara Hassan").await;

    let summary =
        attendance::upload_session(&db, campus.lecturer.id, upload_input(campus.course.id, vec![]))
            .await
            .unwrap();

    assert_eq!(summary.total_students, 2);
    assert_eq!(summary.present_count, 0);
    assert_eq!(summary.absent_count, 2);
    assert_eq!(
        summary.present_count + summary.absent_count,
        summary.total_students
    );
}

/// The unpaid flag is snapshotted into records at upload time; clearing the
/// registry afterwards must not rewrite history.
#[tokio::test]
async fn unpaid_flag_is_a_snapshot_not_a_live_join() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    add_student(&db, campus.stage.id, campus.department.id, "S1", "Ahmed Ali").await;
    add_student(&db, campus.stage.id, campus.department.id, "S2", "Sara Hassan").await;
    services::import::replace_unpaid(&db, campus.department.id, &["S2".to_owned()])
        .await
        .unwrap();

    let first = attendance::upload_session(
        &db,
        campus.lecturer.id,
        upload_input(campus.course.id, vec![scan("S1", 1), scan("S2", 2)]),
    )
    .await
    .unwrap();

    services::import::replace_unpaid(&db, campus.department.id, &[])
        .await
        .unwrap();

    let records = attendance::session_records(&db, first.session_id, campus.lecturer.id)
        .await
        .unwrap();
    let s2 = records.iter().find(|r| r.student_id == "S2").unwrap();
    assert!(s2.is_unpaid, "historical record keeps the upload-time flag");

    let second = attendance::upload_session(
        &db,
        campus.lecturer.id,
        upload_input(campus.course.id, vec![scan("S2", 3)]),
    )
    .await
    .unwrap();
    let records = attendance::session_records(&db, second.session_id, campus.lecturer.id)
        .await
        .unwrap();
    let s2 = records.iter().find(|r| r.student_id == "S2").unwrap();
    assert!(!s2.is_unpaid, "new upload reads the current registry");
}

#[tokio::test]
async fn upload_precondition_errors() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    let other = common::create_lecturer(&db, campus.department.id, "lecturer2").await;
    let unassigned =
        common::create_course(&db, campus.stage.id, "Networks", "NW301", None).await;

    let err = attendance::upload_session(&db, campus.lecturer.id, upload_input(9999, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err =
        attendance::upload_session(&db, campus.lecturer.id, upload_input(unassigned.id, vec![]))
            .await
            .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = attendance::upload_session(&db, other.id, upload_input(campus.course.id, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn list_sessions_is_self_service_with_record_counts() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    let other = common::create_lecturer(&db, campus.department.id, "lecturer2").await;
    add_student(&db, campus.stage.id, campus.department.id, "S1", "Ahmed Ali").await;
    add_student(&db, campus.stage.id, campus.department.id, "S2", "Sara Hassan").await;

    attendance::upload_session(
        &db,
        campus.lecturer.id,
        upload_input(campus.course.id, vec![scan("S1", 1)]),
    )
    .await
    .unwrap();

    let err = attendance::list_sessions(&db, campus.lecturer.id, other.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let sessions = attendance::list_sessions(&db, campus.lecturer.id, campus.lecturer.id)
        .await
        .unwrap();
    assert_eq!(sessions.len(), 1);
    let s = &sessions[0];
    assert_eq!(s.course_code, "DB201");
    assert_eq!(s.total_students, 2);
    assert_eq!(s.present_count, 1);
    assert_eq!(s.absent_count, 1);
}

#[tokio::test]
async fn session_records_ordering_and_unknown_fallback() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    add_student(&db, campus.stage.id, campus.department.id, "S3", "Omar Nasser").await;
    add_student(&db, campus.stage.id, campus.department.id, "S1", "Ahmed Ali").await;
    add_student(&db, campus.stage.id, campus.department.id, "S2", "Sara Hassan").await;

    let summary = attendance::upload_session(
        &db,
        campus.lecturer.id,
        upload_input(campus.course.id, vec![scan("S3", 1), scan("S2", 2)]),
    )
    .await
    .unwrap();

    // Delete S3's student row after the fact; the record must survive with a
    // fallback name.
    student::Entity::delete_many()
        .filter(student::Column::StudentId.eq("S3"))
        .exec(&db)
        .await
        .unwrap();

    let records = attendance::session_records(&db, summary.session_id, campus.lecturer.id)
        .await
        .unwrap();

    let order: Vec<(&str, bool)> = records
        .iter()
        .map(|r| (r.student_id.as_str(), r.is_present))
        .collect();
    assert_eq!(
        order,
        vec![("S2", true), ("S3", true), ("S1", false)],
        "present first, then student id"
    );
    assert_eq!(records[1].full_name, "Unknown");
}

#[tokio::test]
async fn session_records_ownership_boundary() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    let other = common::create_lecturer(&db, campus.department.id, "lecturer2").await;
    add_student(&db, campus.stage.id, campus.department.id, "S1", "Ahmed Ali").await;

    let summary = attendance::upload_session(
        &db,
        campus.lecturer.id,
        upload_input(campus.course.id, vec![scan("S1", 1)]),
    )
    .await
    .unwrap();

    let err = attendance::session_records(&db, summary.session_id, other.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = attendance::session_records(&db, 424242, other.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn department_reports_need_a_course_selection() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    add_student(&db, campus.stage.id, campus.department.id, "S1", "Ahmed Ali").await;

    let none = attendance::department_reports(&db, campus.department.id, None)
        .await
        .unwrap();
    assert!(none.is_empty());

    attendance::upload_session(
        &db,
        campus.lecturer.id,
        upload_input(campus.course.id, vec![scan("S1", 1)]),
    )
    .await
    .unwrap();

    let reports =
        attendance::department_reports(&db, campus.department.id, Some(campus.course.id))
            .await
            .unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].present_count, 1);
    assert_eq!(reports[0].records.len(), 1);

    // A course in a foreign department reads as missing.
    let other_dept = common::create_department(&db, "Physics", "PH").await;
    let err = attendance::department_reports(&db, other_dept.id, Some(campus.course.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

/// A session with zero records past the grace window is the monitoring
/// signal for an upload that crashed between its two write phases.
#[tokio::test]
async fn orphaned_sessions_are_detectable() {
    let db = setup_test_db().await;
    let campus = setup_campus(&db).await;
    add_student(&db, campus.stage.id, campus.department.id, "S1", "Ahmed Ali").await;

    // A healthy upload.
    attendance::upload_session(
        &db,
        campus.lecturer.id,
        upload_input(campus.course.id, vec![scan("S1", 1)]),
    )
    .await
    .unwrap();

    // A session row whose record batch never landed, uploaded an hour ago.
    let stamp = Utc::now() - Duration::hours(1);
    let orphan = attendance_session::ActiveModel {
        id: NotSet,
        course_id: Set(campus.course.id),
        lecturer_id: Set(campus.lecturer.id),
        session_date: Set(stamp),
        started_at: Set(stamp),
        ended_at: Set(stamp),
        total_scanned: Set(5),
        uploaded_at: Set(stamp),
    }
    .insert(&db)
    .await
    .unwrap();

    let orphans = attendance::find_orphaned_sessions(&db, Duration::minutes(10))
        .await
        .unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].id, orphan.id);

    // Everything is younger than a day; nothing qualifies.
    let orphans = attendance::find_orphaned_sessions(&db, Duration::days(1))
        .await
        .unwrap();
    assert!(orphans.is_empty());

    assert_eq!(
        attendance_record::Entity::find()
            .filter(attendance_record::Column::SessionId.eq(orphan.id))
            .count(&db)
            .await
            .unwrap(),
        0
    );
}
