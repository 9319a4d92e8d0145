use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::{FieldDef, FieldKind, Schema};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "bootcamp")]
    pub bootcamp_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
}

impl Review {
    pub const SCHEMA: Schema = Schema {
        table: "reviews",
        fields: &[
            FieldDef::new("id", "id", FieldKind::Uuid),
            FieldDef::new("title", "title", FieldKind::Text),
            FieldDef::new("text", "text", FieldKind::Text),
            FieldDef::new("rating", "rating", FieldKind::Integer),
            FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
            FieldDef::new("bootcamp", "bootcamp_id", FieldKind::Uuid),
            FieldDef::new("user", "user_id", FieldKind::Uuid),
        ],
    };

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}
