//! Department, stage and course management.
//!
//! Super admins own the department list; each department gets exactly one
//! department-user account at creation time. Department users manage their
//! own department's stages and courses, always scoped by the department id
//! from their identity claims — never by a client-supplied id.

use std::collections::HashMap;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;

use chrono::Utc;
use db::models::{course, department, stage, student, user};

use crate::authz;
use crate::error::ServiceError;

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub name: String,
    pub code: String,
    /// Credentials for the department-user account created alongside.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct DepartmentUpdate {
    pub name: String,
    pub code: String,
    /// When set, resets the department user's password.
    pub new_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub stage_id: i64,
    pub name: String,
    pub code: String,
    /// Credentials for the lecturer account created and assigned with the
    /// course.
    pub lecturer_username: String,
    pub lecturer_password: String,
}

/// A stage and its courses, for the department overview page.
#[derive(Debug, Clone, Serialize)]
pub struct StageWithCourses {
    #[serde(flatten)]
    pub stage: stage::Model,
    pub courses: Vec<course::Model>,
}

/// A course annotated with its stage, for course pickers.
#[derive(Debug, Clone, Serialize)]
pub struct CourseWithStage {
    #[serde(flatten)]
    pub course: course::Model,
    pub stage_name: String,
    pub stage_year: i32,
}

pub async fn list_departments(
    db: &DatabaseConnection,
) -> Result<Vec<department::Model>, ServiceError> {
    Ok(department::Entity::find()
        .order_by_asc(department::Column::Name)
        .all(db)
        .await?)
}

/// Creates a department together with its department-user account.
pub async fn create_department(
    db: &DatabaseConnection,
    input: NewDepartment,
) -> Result<department::Model, ServiceError> {
    let code_taken = department::Entity::find()
        .filter(department::Column::Code.eq(input.code.as_str()))
        .one(db)
        .await?
        .is_some();
    if code_taken {
        return Err(ServiceError::conflict("Department code already exists."));
    }

    if user::Model::username_taken(db, &input.username).await? {
        return Err(ServiceError::conflict("Username already exists."));
    }

    let dept = department::ActiveModel {
        id: NotSet,
        name: Set(input.name),
        code: Set(input.code),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    user::Model::create(
        db,
        &input.username,
        &input.password,
        user::Role::DepartmentUser,
        Some(dept.id),
    )
    .await?;

    tracing::info!(department_id = dept.id, code = %dept.code, "department created");
    Ok(dept)
}

pub async fn update_department(
    db: &DatabaseConnection,
    id: i64,
    input: DepartmentUpdate,
) -> Result<department::Model, ServiceError> {
    let dept = department::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Department not found."))?;

    let code_taken = department::Entity::find()
        .filter(department::Column::Code.eq(input.code.as_str()))
        .filter(department::Column::Id.ne(id))
        .one(db)
        .await?
        .is_some();
    if code_taken {
        return Err(ServiceError::conflict("Department code already exists."));
    }

    let mut active: department::ActiveModel = dept.into();
    active.name = Set(input.name);
    active.code = Set(input.code);
    let dept = active.update(db).await?;

    if let Some(password) = input.new_password.filter(|p| !p.trim().is_empty()) {
        let dept_user = user::Entity::find()
            .filter(user::Column::DepartmentId.eq(id))
            .filter(user::Column::Role.eq(user::Role::DepartmentUser))
            .one(db)
            .await?;
        if let Some(dept_user) = dept_user {
            let mut active: user::ActiveModel = dept_user.into();
            active.password_hash = Set(user::Model::hash_password(&password)?);
            active.update(db).await?;
        }
    }

    Ok(dept)
}

/// Deletes a department and its user accounts, but only when it owns no
/// stages and no students — scan history hangs off both.
pub async fn delete_department(db: &DatabaseConnection, id: i64) -> Result<(), ServiceError> {
    let dept = department::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Department not found."))?;

    let stage_count = stage::Entity::find()
        .filter(stage::Column::DepartmentId.eq(id))
        .count(db)
        .await?;
    let student_count = student::Entity::find()
        .filter(student::Column::DepartmentId.eq(id))
        .count(db)
        .await?;

    if stage_count > 0 || student_count > 0 {
        return Err(ServiceError::conflict(format!(
            "Cannot delete department '{}'. It has {} stage(s) and {} student(s). \
             Please delete all stages and students first.",
            dept.name, stage_count, student_count
        )));
    }

    user::Entity::delete_many()
        .filter(user::Column::DepartmentId.eq(id))
        .exec(db)
        .await?;
    department::Entity::delete_by_id(id).exec(db).await?;

    tracing::info!(department_id = id, "department deleted");
    Ok(())
}

/// The department with its stages (by year) and each stage's courses,
/// fetched in three queries regardless of size.
pub async fn department_overview(
    db: &DatabaseConnection,
    department_id: i64,
) -> Result<(department::Model, Vec<StageWithCourses>), ServiceError> {
    let dept = department::Entity::find_by_id(department_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Department not found."))?;

    let stages = stage::Entity::find()
        .filter(stage::Column::DepartmentId.eq(department_id))
        .order_by_asc(stage::Column::Year)
        .all(db)
        .await?;

    let stage_ids: Vec<i64> = stages.iter().map(|s| s.id).collect();
    let mut courses_by_stage: HashMap<i64, Vec<course::Model>> = HashMap::new();
    if !stage_ids.is_empty() {
        let courses = course::Entity::find()
            .filter(course::Column::StageId.is_in(stage_ids))
            .order_by_asc(course::Column::Name)
            .all(db)
            .await?;
        for c in courses {
            courses_by_stage.entry(c.stage_id).or_default().push(c);
        }
    }

    let stages = stages
        .into_iter()
        .map(|s| StageWithCourses {
            courses: courses_by_stage.remove(&s.id).unwrap_or_default(),
            stage: s,
        })
        .collect();

    Ok((dept, stages))
}

pub async fn create_stage(
    db: &DatabaseConnection,
    department_id: i64,
    name: &str,
    year: i32,
) -> Result<stage::Model, ServiceError> {
    let exists = stage::Entity::find()
        .filter(stage::Column::DepartmentId.eq(department_id))
        .filter(stage::Column::Year.eq(year))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Err(ServiceError::conflict(format!(
            "Stage {year} already exists for this department."
        )));
    }

    Ok(stage::ActiveModel {
        id: NotSet,
        department_id: Set(department_id),
        name: Set(name.to_owned()),
        year: Set(year),
    }
    .insert(db)
    .await?)
}

pub async fn delete_stage(
    db: &DatabaseConnection,
    department_id: i64,
    stage_id: i64,
) -> Result<stage::Model, ServiceError> {
    let stage = stage::Entity::find_by_id(stage_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Stage not found."))?;
    authz::require_in_department(stage.department_id, department_id, "Stage")?;

    stage::Entity::delete_by_id(stage_id).exec(db).await?;
    Ok(stage)
}

/// Creates a course under an owned stage together with its lecturer account,
/// and assigns the lecturer to the course.
pub async fn create_course(
    db: &DatabaseConnection,
    department_id: i64,
    input: NewCourse,
) -> Result<course::Model, ServiceError> {
    let stage = stage::Entity::find_by_id(input.stage_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Stage not found."))?;
    authz::require_in_department(stage.department_id, department_id, "Stage")?;

    if user::Model::username_taken(db, &input.lecturer_username).await? {
        return Err(ServiceError::conflict("Username already exists."));
    }

    let course = course::ActiveModel {
        id: NotSet,
        stage_id: Set(stage.id),
        name: Set(input.name),
        code: Set(input.code),
        lecturer_id: Set(None),
    }
    .insert(db)
    .await?;

    let lecturer = user::Model::create(
        db,
        &input.lecturer_username,
        &input.lecturer_password,
        user::Role::Lecturer,
        Some(department_id),
    )
    .await?;

    let mut active: course::ActiveModel = course.into();
    active.lecturer_id = Set(Some(lecturer.id));
    let course = active.update(db).await?;

    tracing::info!(
        course_id = course.id,
        lecturer_id = lecturer.id,
        "course created with lecturer account"
    );
    Ok(course)
}

pub async fn delete_course(
    db: &DatabaseConnection,
    department_id: i64,
    course_id: i64,
) -> Result<course::Model, ServiceError> {
    let course = find_department_course(db, department_id, course_id).await?;
    course::Entity::delete_by_id(course.id).exec(db).await?;
    Ok(course)
}

/// Resets the password of the lecturer assigned to an owned course.
pub async fn reset_lecturer_password(
    db: &DatabaseConnection,
    department_id: i64,
    course_id: i64,
    new_password: &str,
) -> Result<user::Model, ServiceError> {
    let course = find_department_course(db, department_id, course_id).await?;
    let lecturer_id = course
        .lecturer_id
        .ok_or_else(|| ServiceError::not_found("Lecturer not found for this course."))?;

    let lecturer = user::Entity::find_by_id(lecturer_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Lecturer account not found."))?;

    let mut active: user::ActiveModel = lecturer.into();
    active.password_hash = Set(user::Model::hash_password(new_password)?);
    Ok(active.update(db).await?)
}

/// Every course in the department with its stage, ordered by stage year
/// then course name — the course picker for attendance reports.
pub async fn list_department_courses(
    db: &DatabaseConnection,
    department_id: i64,
) -> Result<Vec<CourseWithStage>, ServiceError> {
    let stages: HashMap<i64, (String, i32)> = stage::Entity::find()
        .filter(stage::Column::DepartmentId.eq(department_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, (s.name, s.year)))
        .collect();
    if stages.is_empty() {
        return Ok(Vec::new());
    }

    let courses = course::Entity::find()
        .filter(course::Column::StageId.is_in(stages.keys().copied().collect::<Vec<_>>()))
        .all(db)
        .await?;

    let mut out: Vec<CourseWithStage> = courses
        .into_iter()
        .map(|c| {
            let (stage_name, stage_year) = stages
                .get(&c.stage_id)
                .cloned()
                .unwrap_or_else(|| (String::new(), 0));
            CourseWithStage {
                course: c,
                stage_name,
                stage_year,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        a.stage_year
            .cmp(&b.stage_year)
            .then_with(|| a.course.name.cmp(&b.course.name))
    });
    Ok(out)
}

/// Loads a course and checks it belongs to the department (via its stage).
async fn find_department_course(
    db: &DatabaseConnection,
    department_id: i64,
    course_id: i64,
) -> Result<course::Model, ServiceError> {
    let course = course::Entity::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course not found."))?;
    let stage = stage::Entity::find_by_id(course.stage_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Stage not found for this course."))?;
    authz::require_in_department(stage.department_id, department_id, "Course")?;
    Ok(course)
}
