use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, max = 200, message = "Department name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Department code is required"))]
    pub code: String,

    /// Credentials for the department-user account created alongside.
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, max = 200, message = "Department name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Department code is required"))]
    pub code: String,

    /// When present and non-blank, resets the department user's password.
    pub new_password: Option<String>,
}
