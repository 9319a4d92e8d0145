use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::{FieldDef, FieldKind, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

impl MinimumSkill {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinimumSkill::Beginner => "beginner",
            MinimumSkill::Intermediate => "intermediate",
            MinimumSkill::Advanced => "advanced",
        }
    }
}

impl TryFrom<String> for MinimumSkill {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "beginner" => Ok(MinimumSkill::Beginner),
            "intermediate" => Ok(MinimumSkill::Intermediate),
            "advanced" => Ok(MinimumSkill::Advanced),
            other => Err(format!("'{}' is not a valid skill level", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: i32,
    pub tuition: f64,
    #[sqlx(try_from = "String")]
    pub minimum_skill: MinimumSkill,
    pub scholarship_available: bool,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "bootcamp")]
    pub bootcamp_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
}

impl Course {
    pub const SCHEMA: Schema = Schema {
        table: "courses",
        fields: &[
            FieldDef::new("id", "id", FieldKind::Uuid),
            FieldDef::new("title", "title", FieldKind::Text),
            FieldDef::new("description", "description", FieldKind::Text),
            FieldDef::new("weeks", "weeks", FieldKind::Integer),
            FieldDef::new("tuition", "tuition", FieldKind::Number),
            FieldDef::new("minimumSkill", "minimum_skill", FieldKind::Text),
            FieldDef::new("scholarshipAvailable", "scholarship_available", FieldKind::Boolean),
            FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
            FieldDef::new("bootcamp", "bootcamp_id", FieldKind::Uuid),
            FieldDef::new("user", "user_id", FieldKind::Uuid),
        ],
    };
}
