use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named, date-bounded class. Dates are stored at midnight UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassRequest {
    #[schema(example = "Yoga")]
    pub name: String,
    #[schema(example = "2025-06-01")]
    pub start_date: String,
    #[schema(example = "2025-06-20")]
    pub end_date: String,
    #[schema(minimum = 1, example = 10)]
    pub capacity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingRequest {
    #[schema(example = "Yoga")]
    pub class_name: String,
    #[serde(rename = "name")]
    #[schema(example = "Alice")]
    pub member_name: String,
    #[schema(example = "2025-06-05")]
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".into(),
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            message: Some(message.into()),
        }
    }
}
