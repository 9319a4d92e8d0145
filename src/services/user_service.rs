use chrono::Duration;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::password::{hash_password, hash_reset_token, verify_missing_account, verify_password, ResetToken};
use crate::database::models::{Role, User};
use crate::database::{Page, QueryBuilder};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::services::validation::{not_found, trimmed, Validator, EMAIL_RE};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginUser {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDetails {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassword {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Validated fields for a new account
#[derive(Debug)]
struct NewUser {
    name: String,
    email: String,
    password: String,
    role: Role,
}

fn parse_role(raw: Option<&str>, default: Role) -> Result<Role, ApiError> {
    match trimmed(raw) {
        None => Ok(default),
        Some(r) => r.parse::<Role>().map_err(ApiError::validation_error),
    }
}

fn password_rules(v: &mut Validator, password: Option<&str>) {
    v.required(password, "Please add a password");
    v.check(
        password.map(|p| p.is_empty() || p.chars().count() >= MIN_PASSWORD_LEN).unwrap_or(true),
        "Password must be at least 6 characters",
    );
}

impl RegisterUser {
    /// Self-registration may pick `user` or `publisher`, never `admin`
    fn validate(&self, allow_admin: bool) -> Result<NewUser, ApiError> {
        let mut v = Validator::new();
        v.required(self.name.as_deref(), "Please add a name")
            .required(self.email.as_deref(), "Please add an email")
            .pattern(trimmed(self.email.as_deref()).as_deref(), &EMAIL_RE, "Please add a valid email");
        password_rules(&mut v, self.password.as_deref());
        v.finish()?;

        let role = parse_role(self.role.as_deref(), Role::User)?;
        if !allow_admin && !role.is_self_assignable() {
            return Err(ApiError::validation_error(format!("Role '{}' cannot be self-assigned", role)));
        }

        Ok(NewUser {
            name: trimmed(self.name.as_deref()).unwrap_or_default(),
            email: trimmed(self.email.as_deref()).unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            role,
        })
    }
}

/// Accounts, credentials and password reset
pub struct UserService<'a> {
    state: &'a AppState,
}

impl<'a> UserService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn register(&self, input: RegisterUser) -> Result<(User, String), ApiError> {
        let user = self.insert(input.validate(false)?).await?;
        tracing::info!("Registered user {} as {}", user.id, user.role);
        let token = self.state.tokens.issue(user.id)?;
        Ok((user, token))
    }

    /// Unknown email and wrong password produce the same error
    pub async fn login(&self, input: LoginUser) -> Result<(User, String), ApiError> {
        let (Some(email), Some(password)) = (trimmed(input.email.as_deref()), input.password.filter(|p| !p.is_empty()))
        else {
            return Err(ApiError::validation_error("Please provide an email and password"));
        };

        let Some(user) = self.find_by_email(&email).await? else {
            verify_missing_account(&password).await?;
            return Err(ApiError::invalid_credentials());
        };
        if !verify_password(&password, &user.password).await? {
            tracing::debug!("Password mismatch for user {}", user.id);
            return Err(ApiError::invalid_credentials());
        }

        let token = self.state.tokens.issue(user.id)?;
        Ok((user, token))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.state.pool)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        self.find_by_id(id).await?.ok_or_else(|| not_found("User", id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.state.pool)
            .await?)
    }

    /// Store a hashed reset token and hand back the plaintext once
    pub async fn forgot_password(&self, email: Option<&str>) -> Result<ResetToken, ApiError> {
        let email = trimmed(email).ok_or_else(|| ApiError::validation_error("Please provide an email"))?;
        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::not_found("There is no user with that email"))?;

        let ttl = Duration::minutes(self.state.config.security.reset_token_expiry_minutes);
        let token = ResetToken::generate(ttl);

        sqlx::query("UPDATE users SET reset_password_token = $2, reset_password_expire = $3 WHERE id = $1")
            .bind(user.id)
            .bind(&token.hashed)
            .bind(token.expires_at)
            .execute(&self.state.pool)
            .await?;

        tracing::info!("Issued password reset token for user {}", user.id);
        Ok(token)
    }

    pub async fn reset_password(&self, reset_token: &str, password: Option<&str>) -> Result<(User, String), ApiError> {
        let mut v = Validator::new();
        password_rules(&mut v, password);
        v.finish()?;

        let hashed = hash_reset_token(reset_token);
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE reset_password_token = $1 AND reset_password_expire > now()",
        )
        .bind(&hashed)
        .fetch_optional(&self.state.pool)
        .await?
        .ok_or_else(|| ApiError::validation_error("Invalid token"))?;

        let password_hash = hash_password(password.unwrap_or_default()).await?;
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET password = $2, reset_password_token = NULL, reset_password_expire = NULL \
             WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .bind(&password_hash)
        .fetch_one(&self.state.pool)
        .await?;

        let token = self.state.tokens.issue(user.id)?;
        Ok((user, token))
    }

    /// Change name and/or email; the password is untouched
    pub async fn update_details(&self, id: Uuid, input: UpdateDetails) -> Result<User, ApiError> {
        let name = trimmed(input.name.as_deref());
        let email = trimmed(input.email.as_deref());
        Validator::new()
            .check(input.name.is_none() || name.is_some(), "Please add a name")
            .check(input.email.is_none() || email.is_some(), "Please add an email")
            .pattern(email.as_deref(), &EMAIL_RE, "Please add a valid email")
            .finish()?;

        sqlx::query_as::<_, User>(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email) WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(&self.state.pool)
        .await?
        .ok_or_else(|| not_found("User", id))
    }

    pub async fn update_password(&self, id: Uuid, input: UpdatePassword) -> Result<String, ApiError> {
        let mut v = Validator::new();
        v.required(input.current_password.as_deref(), "Please provide your current password");
        password_rules(&mut v, input.new_password.as_deref());
        v.finish()?;

        let user = self.get(id).await?;
        if !verify_password(input.current_password.as_deref().unwrap_or_default(), &user.password).await? {
            return Err(ApiError::unauthorized("Password is incorrect"));
        }

        let password_hash = hash_password(input.new_password.as_deref().unwrap_or_default()).await?;
        sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(&password_hash)
            .execute(&self.state.pool)
            .await?;

        Ok(self.state.tokens.issue(id)?)
    }

    pub async fn list(&self, data: &FilterData) -> Result<Page, ApiError> {
        Ok(QueryBuilder::<User>::new(&User::SCHEMA).page(&self.state.pool, data).await?)
    }

    /// Admin account creation; any role is allowed
    pub async fn create(&self, input: RegisterUser) -> Result<User, ApiError> {
        self.insert(input.validate(true)?).await
    }

    /// Admin edit. The password is re-hashed only when a new one is supplied.
    pub async fn update(&self, id: Uuid, input: UpdateUser) -> Result<User, ApiError> {
        let name = trimmed(input.name.as_deref());
        let email = trimmed(input.email.as_deref());
        let mut v = Validator::new();
        v.check(input.name.is_none() || name.is_some(), "Please add a name")
            .pattern(email.as_deref(), &EMAIL_RE, "Please add a valid email");
        if input.password.is_some() {
            password_rules(&mut v, input.password.as_deref());
        }
        v.finish()?;

        let role = match input.role.as_deref() {
            Some(raw) => Some(parse_role(Some(raw), Role::User)?),
            None => None,
        };
        let password_hash = match input.password.as_deref() {
            Some(p) => Some(hash_password(p).await?),
            None => None,
        };

        sqlx::query_as::<_, User>(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             role = COALESCE($4, role), password = COALESCE($5, password) WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role.map(|r| r.as_str()))
        .bind(password_hash)
        .fetch_optional(&self.state.pool)
        .await?
        .ok_or_else(|| not_found("User", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.state.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("User", id));
        }
        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, ApiError> {
        let password_hash = hash_password(&new_user.password).await?;
        Ok(sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, role, password) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(new_user.role.as_str())
        .bind(&password_hash)
        .fetch_one(&self.state.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, email: &str, password: &str, role: Option<&str>) -> RegisterUser {
        RegisterUser {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
            role: role.map(String::from),
        }
    }

    #[test]
    fn registration_defaults_to_user_role() {
        let user = register("A", "a@x.com", "secret1", None).validate(false).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn publishers_may_self_register() {
        let user = register("A", "a@x.com", "secret1", Some("publisher")).validate(false).unwrap();
        assert_eq!(user.role, Role::Publisher);
    }

    #[test]
    fn admin_cannot_be_self_assigned() {
        assert!(register("A", "a@x.com", "secret1", Some("admin")).validate(false).is_err());
        assert_eq!(
            register("A", "a@x.com", "secret1", Some("admin")).validate(true).unwrap().role,
            Role::Admin
        );
    }

    #[test]
    fn all_field_errors_are_reported() {
        let err = RegisterUser::default().validate(false).unwrap_err();
        assert_eq!(err.message(), "Please add a name, Please add an email, Please add a password");
    }

    #[test]
    fn short_password_and_bad_email_are_rejected() {
        let err = register("A", "nope", "12345", None).validate(false).unwrap_err();
        assert_eq!(err.message(), "Please add a valid email, Password must be at least 6 characters");
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = register("A", "a@x.com", "secret1", Some("root")).validate(false).unwrap_err();
        assert_eq!(err.message(), "'root' is not a valid role");
    }
}
