//! Database fixtures shared by the API tests.

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, DatabaseConnection};

use db::models::{course, department, stage, student, user};

#[allow(dead_code)]
pub struct Campus {
    pub department: department::Model,
    pub stage: stage::Model,
    pub course: course::Model,
    pub lecturer: user::Model,
}

pub async fn create_department(
    db: &DatabaseConnection,
    name: &str,
    code: &str,
) -> department::Model {
    department::ActiveModel {
        id: NotSet,
        name: Set(name.to_owned()),
        code: Set(code.to_owned()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create department")
}

pub async fn create_stage(
    db: &DatabaseConnection,
    department_id: i64,
    name: &str,
    year: i32,
) -> stage::Model {
    stage::ActiveModel {
        id: NotSet,
        department_id: Set(department_id),
        name: Set(name.to_owned()),
        year: Set(year),
    }
    .insert(db)
    .await
    .expect("Failed to create stage")
}

pub async fn create_course(
    db: &DatabaseConnection,
    stage_id: i64,
    name: &str,
    code: &str,
    lecturer_id: Option<i64>,
) -> course::Model {
    course::ActiveModel {
        id: NotSet,
        stage_id: Set(stage_id),
        name: Set(name.to_owned()),
        code: Set(code.to_owned()),
        lecturer_id: Set(lecturer_id),
    }
    .insert(db)
    .await
    .expect("Failed to create course")
}

pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    role: user::Role,
    department_id: Option<i64>,
) -> user::Model {
    user::Model::create(db, username, "password123", role, department_id)
        .await
        .expect("Failed to create user")
}

pub async fn add_student(
    db: &DatabaseConnection,
    stage_id: i64,
    department_id: i64,
    student_id: &str,
    full_name: &str,
) -> student::Model {
    student::ActiveModel {
        id: NotSet,
        student_id: Set(student_id.to_owned()),
        full_name: Set(full_name.to_owned()),
        stage_id: Set(stage_id),
        department_id: Set(department_id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create student")
}

/// One department, one stage, one course taught by `lecturer1`
/// (password `password123`).
pub async fn setup_campus(db: &DatabaseConnection) -> Campus {
    let department = create_department(db, "Computer Science", "CS").await;
    let stage = create_stage(db, department.id, "Stage 2", 2).await;
    let lecturer = create_user(db, "lecturer1", user::Role::Lecturer, Some(department.id)).await;
    let course = create_course(db, stage.id, "Databases", "DB201", Some(lecturer.id)).await;

    Campus {
        department,
        stage,
        course,
        lecturer,
    }
}
