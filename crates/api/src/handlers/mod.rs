pub mod proxy;
pub mod start;
pub mod tick;

use crate::error::AppError;

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
