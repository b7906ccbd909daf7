//! Validation rules for models

use std::borrow::Cow;
use std::collections::HashMap;

use validator::ValidationError;

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError {
            code: Cow::from("blank"),
            message: Some(Cow::from("Value must not be blank.")),
            params: HashMap::new(),
        })
    } else {
        Ok(())
    }
}
