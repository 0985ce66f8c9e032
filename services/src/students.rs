//! Roster queries: department listings and the per-course roster served to
//! the mobile app.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;

use db::models::{course, stage, student, unpaid_student};

use crate::authz;
use crate::error::ServiceError;

/// A roster entry for the scanning device, with a live unpaid flag.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub full_name: String,
    pub is_unpaid: bool,
}

/// A student with the stage they belong to, for department listings.
#[derive(Debug, Clone, Serialize)]
pub struct StudentWithStage {
    #[serde(flatten)]
    pub student: student::Model,
    pub stage_name: String,
    pub stage_year: i32,
}

/// The current roster of a course's stage, ordered by full name, with each
/// student's unpaid flag from the live registry. Lecturer-owned: only the
/// course's assigned lecturer may fetch it.
pub async fn course_roster(
    db: &DatabaseConnection,
    caller_id: i64,
    course_id: i64,
) -> Result<Vec<RosterEntry>, ServiceError> {
    let course = course::Entity::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course not found."))?;
    authz::require_course_lecturer(&course, caller_id)?;

    let stage = stage::Entity::find_by_id(course.stage_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Stage not found for this course."))?;

    let unpaid: HashSet<String> = unpaid_student::Entity::find()
        .filter(unpaid_student::Column::DepartmentId.eq(stage.department_id))
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.student_id)
        .collect();

    Ok(student::Entity::find()
        .filter(student::Column::StageId.eq(stage.id))
        .order_by_asc(student::Column::FullName)
        .all(db)
        .await?
        .into_iter()
        .map(|s| RosterEntry {
            is_unpaid: unpaid.contains(&s.student_id),
            student_id: s.student_id,
            full_name: s.full_name,
        })
        .collect())
}

/// All students of a department ordered by stage year then full name.
pub async fn department_students(
    db: &DatabaseConnection,
    department_id: i64,
) -> Result<Vec<StudentWithStage>, ServiceError> {
    let stages: HashMap<i64, (String, i32)> = stage::Entity::find()
        .filter(stage::Column::DepartmentId.eq(department_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, (s.name, s.year)))
        .collect();

    let students = student::Entity::find()
        .filter(student::Column::DepartmentId.eq(department_id))
        .all(db)
        .await?;

    let mut out: Vec<StudentWithStage> = students
        .into_iter()
        .map(|s| {
            let (stage_name, stage_year) = stages
                .get(&s.stage_id)
                .cloned()
                .unwrap_or_else(|| (String::new(), 0));
            StudentWithStage {
                student: s,
                stage_name,
                stage_year,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        a.stage_year
            .cmp(&b.stage_year)
            .then_with(|| a.student.full_name.cmp(&b.student.full_name))
    });
    Ok(out)
}

/// Development helper behind the non-production test routes: fills an empty
/// stage with ten fixed students, two of them flagged unpaid. Returns the
/// number of students inserted (zero when the stage already has any).
pub async fn seed_course_students(
    db: &DatabaseConnection,
    course_id: i64,
) -> Result<usize, ServiceError> {
    const SEED_STUDENTS: [(&str, &str); 10] = [
        ("10000001", "Ahmed Ali"),
        ("10000002", "Sara Hassan"),
        ("10000003", "Mohammed Ibrahim"),
        ("10000004", "Fatima Karim"),
        ("10000005", "Omar Nasser"),
        ("10000006", "Noor Rashid"),
        ("10000007", "Hassan Majeed"),
        ("10000008", "Zahra Salim"),
        ("10000009", "Yusuf Adel"),
        ("10000010", "Maryam Fouad"),
    ];
    const SEED_UNPAID: [&str; 2] = ["10000003", "10000007"];

    let course = course::Entity::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course not found."))?;
    let stage = stage::Entity::find_by_id(course.stage_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Stage not found for this course."))?;

    let existing = student::Entity::find()
        .filter(student::Column::StageId.eq(stage.id))
        .count(db)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    let now = Utc::now();
    let students: Vec<student::ActiveModel> = SEED_STUDENTS
        .iter()
        .map(|(student_id, full_name)| student::ActiveModel {
            id: NotSet,
            student_id: Set((*student_id).to_owned()),
            full_name: Set((*full_name).to_owned()),
            stage_id: Set(stage.id),
            department_id: Set(stage.department_id),
            created_at: Set(now),
        })
        .collect();
    student::Entity::insert_many(students).exec(db).await?;

    let unpaid: Vec<unpaid_student::ActiveModel> = SEED_UNPAID
        .iter()
        .map(|student_id| unpaid_student::ActiveModel {
            id: NotSet,
            student_id: Set((*student_id).to_owned()),
            department_id: Set(stage.department_id),
            marked_unpaid_at: Set(now),
            notes: Set(None),
        })
        .collect();
    unpaid_student::Entity::insert_many(unpaid).exec(db).await?;

    Ok(SEED_STUDENTS.len())
}
