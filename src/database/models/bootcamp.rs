use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::{FieldDef, FieldKind, Schema};

/// Allowed values of `careers`
pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

/// GeoJSON point plus the geocoder's address breakdown. Coordinates are `[lng, lat]`.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub location_type: String,
    pub coordinates: Vec<f64>,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[sqlx(flatten)]
    pub location: Location,
    pub careers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
}

impl Bootcamp {
    pub const SCHEMA: Schema = Schema {
        table: "bootcamps",
        fields: &[
            FieldDef::new("id", "id", FieldKind::Uuid),
            FieldDef::new("user", "user_id", FieldKind::Uuid),
            FieldDef::new("name", "name", FieldKind::Text),
            FieldDef::new("slug", "slug", FieldKind::Text),
            FieldDef::new("description", "description", FieldKind::Text),
            FieldDef::new("website", "website", FieldKind::Text),
            FieldDef::new("phone", "phone", FieldKind::Text),
            FieldDef::new("email", "email", FieldKind::Text),
            FieldDef::new("location.formattedAddress", "formatted_address", FieldKind::Text),
            FieldDef::new("location.street", "street", FieldKind::Text),
            FieldDef::new("location.city", "city", FieldKind::Text),
            FieldDef::new("location.state", "state", FieldKind::Text),
            FieldDef::new("location.zipcode", "zipcode", FieldKind::Text),
            FieldDef::new("location.country", "country", FieldKind::Text),
            FieldDef::new("careers", "careers", FieldKind::TextArray),
            FieldDef::new("averageRating", "average_rating", FieldKind::Number),
            FieldDef::new("averageCost", "average_cost", FieldKind::Number),
            FieldDef::new("photo", "photo", FieldKind::Text),
            FieldDef::new("housing", "housing", FieldKind::Boolean),
            FieldDef::new("jobAssistance", "job_assistance", FieldKind::Boolean),
            FieldDef::new("jobGuarantee", "job_guarantee", FieldKind::Boolean),
            FieldDef::new("acceptGi", "accept_gi", FieldKind::Boolean),
            FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
        ],
    };

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// What a course or review shows of its parent bootcamp
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BootcampSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}
