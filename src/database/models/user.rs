use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::{FieldDef, FieldKind, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Publisher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }

    /// Roles a caller may pick for themselves at registration
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::User | Role::Publisher)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "publisher" => Ok(Role::Publisher),
            "admin" => Ok(Role::Admin),
            other => Err(format!("'{}' is not a valid role", other)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Account row. Credentials and reset state never leave the server.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expire: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub const SCHEMA: Schema = Schema {
        table: "users",
        fields: &[
            FieldDef::new("id", "id", FieldKind::Uuid),
            FieldDef::new("name", "name", FieldKind::Text),
            FieldDef::new("email", "email", FieldKind::Text),
            FieldDef::new("role", "role", FieldKind::Text),
            FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "John Doe".into(),
            email: "john@gmail.com".into(),
            role: Role::Publisher,
            password: "$argon2id$v=19$...".into(),
            reset_password_token: Some("abc".into()),
            reset_password_expire: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn serialized_user_has_no_credentials() {
        let value = serde_json::to_value(user()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("resetPasswordToken"));
        assert!(!obj.contains_key("resetPasswordExpire"));
        assert_eq!(obj["role"], "publisher");
        assert!(obj.contains_key("createdAt"));
    }

    #[test]
    fn only_user_and_publisher_are_self_assignable() {
        assert!(Role::User.is_self_assignable());
        assert!(Role::Publisher.is_self_assignable());
        assert!(!Role::Admin.is_self_assignable());
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn password_is_not_queryable() {
        assert!(User::SCHEMA.field("password").is_err());
    }
}
