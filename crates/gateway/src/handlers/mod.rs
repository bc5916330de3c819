//! API handlers module

pub mod catalog;
pub mod consult;
pub mod health;
pub mod search;

use acervo_common::errors::AppError;
use validator::Validate;

/// Run request validation, mapping failures to a 400
pub(crate) fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: e.field_errors().keys().next().map(|field| field.to_string()),
    })
}
