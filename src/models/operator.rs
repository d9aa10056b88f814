use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Someone allowed into the console. Logs in with `access_code`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub access_code: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Operator {
    pub fn new(name: String, email: Option<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            access_code: Uuid::new_v4().to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
