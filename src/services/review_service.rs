use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Review;
use crate::database::{Expansion, Page, QueryBuilder};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::auth::AuthUser;
use crate::observer::{MutationEvent, Operation};
use crate::services::bootcamp_service::BootcampService;
use crate::services::validation::{not_found, trimmed, Validator};
use crate::state::AppState;

const REVIEWS: &str = "reviews";
const TITLE_MAX: usize = 100;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReviewInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

impl ReviewInput {
    fn validate(&self, creating: bool) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if creating || self.title.is_some() {
            v.required(self.title.as_deref(), "Please add a title for the review");
        }
        v.max_len(self.title.as_deref(), TITLE_MAX, "Title cannot be more than 100 characters");
        if creating || self.text.is_some() {
            v.required(self.text.as_deref(), "Please add some text");
        }
        v.check(
            match self.rating {
                Some(r) => (1..=10).contains(&r),
                None => !creating,
            },
            "Please add a rating between 1 and 10",
        );
        v.finish()
    }
}

fn ensure_author(review: &Review, user: &AuthUser, action: &str) -> Result<(), ApiError> {
    if review.is_authored_by(user.id) || user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!("Not authorized to {} review", action)))
    }
}

pub struct ReviewService<'a> {
    state: &'a AppState,
}

impl<'a> ReviewService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self, data: &FilterData) -> Result<Page, ApiError> {
        Ok(QueryBuilder::<Review>::new(&Review::SCHEMA)
            .expand(Expansion::BootcampSummary)
            .page(&self.state.pool, data)
            .await?)
    }

    pub async fn list_for_bootcamp(&self, bootcamp_id: Uuid) -> Result<Vec<Review>, ApiError> {
        BootcampService::new(self.state).get(bootcamp_id).await?;

        Ok(sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE bootcamp_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(bootcamp_id)
        .fetch_all(&self.state.pool)
        .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Review, ApiError> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.state.pool)
            .await?
            .ok_or_else(|| not_found("Review", id))
    }

    /// One review per user per bootcamp, enforced by `reviews_bootcamp_id_user_id_key`
    pub async fn create(&self, bootcamp_id: Uuid, user: &AuthUser, input: ReviewInput) -> Result<Review, ApiError> {
        let bootcamp = BootcampService::new(self.state).get(bootcamp_id).await?;
        input.validate(true)?;

        let review = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, title, text, rating, bootcamp_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(trimmed(input.title.as_deref()))
        .bind(&input.text)
        .bind(input.rating)
        .bind(bootcamp.id)
        .bind(user.id)
        .fetch_one(&self.state.pool)
        .await?;

        tracing::info!("User {} reviewed bootcamp {}", user.id, bootcamp.id);
        self.notify(Operation::Create, bootcamp.id).await;
        Ok(review)
    }

    pub async fn update(&self, id: Uuid, user: &AuthUser, input: ReviewInput) -> Result<Review, ApiError> {
        let mut review = self.get(id).await?;
        ensure_author(&review, user, "update")?;
        input.validate(false)?;

        if let Some(title) = trimmed(input.title.as_deref()) {
            review.title = title;
        }
        if let Some(text) = input.text {
            review.text = text;
        }
        review.rating = input.rating.unwrap_or(review.rating);

        let updated = sqlx::query_as::<_, Review>(
            "UPDATE reviews SET title = $2, text = $3, rating = $4 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&review.title)
        .bind(&review.text)
        .bind(review.rating)
        .fetch_optional(&self.state.pool)
        .await?
        .ok_or_else(|| not_found("Review", id))?;

        tracing::info!("Updated review {}", id);
        self.notify(Operation::Update, updated.bootcamp_id).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid, user: &AuthUser) -> Result<(), ApiError> {
        let review = self.get(id).await?;
        ensure_author(&review, user, "delete")?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.state.pool)
            .await?;

        tracing::info!("Deleted review {}", id);
        self.notify(Operation::Delete, review.bootcamp_id).await;
        Ok(())
    }

    async fn notify(&self, operation: Operation, bootcamp_id: Uuid) {
        self.state
            .observers
            .notify(&MutationEvent::new(operation, REVIEWS, bootcamp_id))
            .await;
    }
}
