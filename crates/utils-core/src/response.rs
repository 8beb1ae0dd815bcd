use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Standard envelope for every API response body.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_has_no_message() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["data"], serde_json::json!(42));
        assert_eq!(json["message"], serde_json::Value::Null);
    }

    #[test]
    fn error_envelope_carries_message() {
        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(json["message"], serde_json::json!("nope"));
    }
}
