pub mod m202510010001_create_departments;
pub mod m202510010002_create_users;
pub mod m202510010003_create_stages;
pub mod m202510010004_create_courses;
pub mod m202510010005_create_students;
pub mod m202510010006_create_unpaid_students;
pub mod m202510020001_create_api_tokens;
pub mod m202510050001_create_attendance;
