//! Response envelopes of the app

use validator::ValidationErrors;

/// Envelope for successful responses
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data }
    }
}

/// Per-field message of a request validation failure
#[derive(Serialize, Deserialize, Debug)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

/// Envelope for failed responses
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(rename = "validationErrors", skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<FieldValidationError>>,
}

impl ApiErrorResponse {
    pub fn from_message(message: &str) -> Self {
        Self {
            success: false,
            error: message.to_string(),
            validation_errors: None,
        }
    }

    pub fn from_validation_errors(errors: ValidationErrors) -> Self {
        let validation_errors = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.into_iter().map(move |error| FieldValidationError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string()),
                })
            })
            .collect();

        Self {
            success: false,
            error: "Validation failed".to_string(),
            validation_errors: Some(validation_errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json;

    use super::*;

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::success("Ok".to_string());
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r##"{"success":true,"data":"Ok"}"##);
    }

    #[test]
    fn test_error_envelope_without_validation_errors() {
        let response = ApiErrorResponse::from_message("Internal server error");
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r##"{"success":false,"error":"Internal server error"}"##);
    }
}
