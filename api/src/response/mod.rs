use serde::Serialize;

/// Standard JSON envelope for every endpoint:
///
/// ```json
/// { "success": true, "data": { ... }, "message": "Session uploaded successfully." }
/// ```
///
/// Error responses flip `success`, default `data`, and carry the reason in
/// `message`.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Error response; `T` must implement `Default` since there is no
    /// meaningful payload.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// Empty payload for responses that carry only a message.
#[derive(Serialize, Default)]
pub struct Empty;
