//! Bulk import validation for rosters and the unpaid-fee registry.
//!
//! Input is already-parsed tabular rows; spreadsheet cell extraction happens
//! outside this system (student sheet: student id, full name, stage year —
//! unpaid sheet: student id only). Row numbers in errors are sheet rows, so
//! the first data row is 2, matching what the operator sees in their file.
//!
//! Both imports are all-or-nothing: the first invalid row aborts the batch
//! and nothing is persisted. The unpaid registry is *replaced* wholesale on
//! every upload — never merged — so the stored set is always exactly the
//! last successful import.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use serde::Deserialize;

use db::models::{stage, student, unpaid_student};

use crate::error::ServiceError;

/// First sheet row that can hold data (row 1 is the header).
const FIRST_DATA_ROW: usize = 2;

/// One row of the student sheet, cells as text. The stage year is kept as
/// text so a non-numeric cell can be reported against its row.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRow {
    pub student_id: String,
    pub full_name: String,
    pub stage_year: String,
}

/// Validates a student sheet for a department and returns rows ready to
/// insert. Fails on the first invalid row: missing cell, student id already
/// in the system (uniqueness is system-wide, not per department), duplicate
/// within the file, or a stage year the department does not have.
pub async fn import_students(
    db: &DatabaseConnection,
    department_id: i64,
    rows: &[StudentRow],
) -> Result<Vec<student::ActiveModel>, ServiceError> {
    let stages: HashMap<i32, i64> = stage::Entity::find()
        .filter(stage::Column::DepartmentId.eq(department_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.year, s.id))
        .collect();

    if stages.is_empty() {
        return Err(ServiceError::invalid_input(
            "Please create stages before uploading students.",
        ));
    }

    let existing = existing_student_ids(db, rows.iter().map(|r| r.student_id.trim())).await?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut validated = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let sheet_row = idx + FIRST_DATA_ROW;
        let student_id = row.student_id.trim();
        let full_name = row.full_name.trim();
        let stage_year = row.stage_year.trim();

        if student_id.is_empty() || full_name.is_empty() || stage_year.is_empty() {
            return Err(ServiceError::row(
                sheet_row,
                "All fields (StudentId, FullName, Stage) are required.",
            ));
        }

        if existing.contains(student_id) {
            return Err(ServiceError::row(
                sheet_row,
                format!("Student ID '{student_id}' already exists in the system."),
            ));
        }

        if !seen.insert(student_id.to_owned()) {
            return Err(ServiceError::row(
                sheet_row,
                format!("Student ID '{student_id}' appears more than once in the file."),
            ));
        }

        let year: i32 = stage_year.parse().map_err(|_| {
            ServiceError::row(sheet_row, "Stage must be a number (1, 2, 3, or 4).")
        })?;

        let stage_id = *stages.get(&year).ok_or_else(|| {
            ServiceError::row(
                sheet_row,
                format!("Stage {year} does not exist for this department. Please create it first."),
            )
        })?;

        validated.push(student::ActiveModel {
            id: NotSet,
            student_id: Set(student_id.to_owned()),
            full_name: Set(full_name.to_owned()),
            stage_id: Set(stage_id),
            department_id: Set(department_id),
            created_at: Set(Utc::now()),
        });
    }

    Ok(validated)
}

/// Persists a validated batch in one transaction. Returns the inserted
/// count.
pub async fn persist_students(
    db: &DatabaseConnection,
    students: Vec<student::ActiveModel>,
) -> Result<usize, ServiceError> {
    let count = students.len();
    if count == 0 {
        return Ok(0);
    }

    let txn = db.begin().await?;
    student::Entity::insert_many(students).exec(&txn).await?;
    txn.commit().await?;

    Ok(count)
}

/// Validates an unpaid sheet for a department: blank rows are skipped, an
/// unknown student id (in that department) aborts the batch, and the result
/// is de-duplicated preserving first occurrence.
pub async fn import_unpaid(
    db: &DatabaseConnection,
    department_id: i64,
    rows: &[String],
) -> Result<Vec<String>, ServiceError> {
    let department_students: HashSet<String> = student::Entity::find()
        .filter(student::Column::DepartmentId.eq(department_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.student_id)
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut ids = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let sheet_row = idx + FIRST_DATA_ROW;
        let student_id = row.trim();

        if student_id.is_empty() {
            continue;
        }

        if !department_students.contains(student_id) {
            return Err(ServiceError::row(
                sheet_row,
                format!("Student ID '{student_id}' not found in this department."),
            ));
        }

        if seen.insert(student_id.to_owned()) {
            ids.push(student_id.to_owned());
        }
    }

    Ok(ids)
}

/// Replaces the department's unpaid registry with `ids`: delete-all plus
/// insert-new in one transaction. This is a snapshot replace by design —
/// notes on old entries do not survive a re-upload.
pub async fn replace_unpaid(
    db: &DatabaseConnection,
    department_id: i64,
    ids: &[String],
) -> Result<usize, ServiceError> {
    let txn = db.begin().await?;

    unpaid_student::Entity::delete_many()
        .filter(unpaid_student::Column::DepartmentId.eq(department_id))
        .exec(&txn)
        .await?;

    if !ids.is_empty() {
        let now = Utc::now();
        let rows: Vec<unpaid_student::ActiveModel> = ids
            .iter()
            .map(|student_id| unpaid_student::ActiveModel {
                id: NotSet,
                student_id: Set(student_id.clone()),
                department_id: Set(department_id),
                marked_unpaid_at: Set(now),
                notes: Set(None),
            })
            .collect();
        unpaid_student::Entity::insert_many(rows).exec(&txn).await?;
    }

    txn.commit().await?;

    tracing::info!(
        department_id,
        count = ids.len(),
        "unpaid registry replaced"
    );

    Ok(ids.len())
}

/// System-wide lookup of which of the given ids already exist.
async fn existing_student_ids<'a>(
    db: &DatabaseConnection,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashSet<String>, ServiceError> {
    let ids: Vec<String> = ids
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if ids.is_empty() {
        return Ok(HashSet::new());
    }

    Ok(student::Entity::find()
        .filter(student::Column::StudentId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.student_id)
        .collect())
}
