use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Course, MinimumSkill};
use crate::database::{Expansion, Page, QueryBuilder};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::auth::AuthUser;
use crate::observer::{MutationEvent, Operation};
use crate::services::bootcamp_service::BootcampService;
use crate::services::validation::{not_found, trimmed, Validator};
use crate::state::AppState;

const COURSES: &str = "courses";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<i32>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

impl CourseInput {
    fn validate(&self, creating: bool) -> Result<Option<MinimumSkill>, ApiError> {
        let mut v = Validator::new();

        if creating || self.title.is_some() {
            v.required(self.title.as_deref(), "Please add a course title");
        }
        if creating || self.description.is_some() {
            v.required(self.description.as_deref(), "Please add a description");
        }
        if creating {
            v.check(self.weeks.is_some(), "Please add number of weeks")
                .check(self.tuition.is_some(), "Please add a tuition cost")
                .required(self.minimum_skill.as_deref(), "Please add a minimum skill");
        }
        v.check(self.weeks.map(|w| w > 0).unwrap_or(true), "Number of weeks must be positive")
            .check(
                self.tuition.map(|t| t.is_finite() && t >= 0.0).unwrap_or(true),
                "Tuition cost cannot be negative",
            );

        let skill = match trimmed(self.minimum_skill.as_deref()) {
            Some(raw) => match MinimumSkill::try_from(raw.to_lowercase()) {
                Ok(skill) => Some(skill),
                Err(message) => {
                    v.check(false, &message);
                    None
                }
            },
            None => None,
        };

        v.finish()?;
        Ok(skill)
    }
}

pub struct CourseService<'a> {
    state: &'a AppState,
}

impl<'a> CourseService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self, data: &FilterData) -> Result<Page, ApiError> {
        Ok(QueryBuilder::<Course>::new(&Course::SCHEMA)
            .expand(Expansion::BootcampSummary)
            .page(&self.state.pool, data)
            .await?)
    }

    /// Every course of one bootcamp, unpaginated
    pub async fn list_for_bootcamp(&self, bootcamp_id: Uuid) -> Result<Vec<Course>, ApiError> {
        BootcampService::new(self.state).get(bootcamp_id).await?;

        Ok(sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE bootcamp_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(bootcamp_id)
        .fetch_all(&self.state.pool)
        .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Course, ApiError> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.state.pool)
            .await?
            .ok_or_else(|| not_found("Course", id))
    }

    /// Only the bootcamp's owner (or an admin) may add courses to it
    pub async fn create(&self, bootcamp_id: Uuid, user: &AuthUser, input: CourseInput) -> Result<Course, ApiError> {
        let bootcamp = BootcampService::new(self.state)
            .get_owned(bootcamp_id, user, "add a course to")
            .await?;
        let skill = input.validate(true)?.unwrap_or(MinimumSkill::Beginner);

        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (id, title, description, weeks, tuition, minimum_skill, \
             scholarship_available, bootcamp_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(trimmed(input.title.as_deref()))
        .bind(&input.description)
        .bind(input.weeks)
        .bind(input.tuition)
        .bind(skill.as_str())
        .bind(input.scholarship_available.unwrap_or(false))
        .bind(bootcamp.id)
        .bind(user.id)
        .fetch_one(&self.state.pool)
        .await?;

        tracing::info!("Created course {} under bootcamp {}", course.id, bootcamp.id);
        self.notify(Operation::Create, bootcamp.id).await;
        Ok(course)
    }

    pub async fn update(&self, id: Uuid, user: &AuthUser, input: CourseInput) -> Result<Course, ApiError> {
        let mut course = self.get(id).await?;
        BootcampService::new(self.state)
            .get_owned(course.bootcamp_id, user, "update a course of")
            .await?;
        let skill = input.validate(false)?;

        if let Some(title) = trimmed(input.title.as_deref()) {
            course.title = title;
        }
        if let Some(description) = input.description {
            course.description = description;
        }
        course.weeks = input.weeks.unwrap_or(course.weeks);
        course.tuition = input.tuition.unwrap_or(course.tuition);
        course.minimum_skill = skill.unwrap_or(course.minimum_skill);
        course.scholarship_available = input.scholarship_available.unwrap_or(course.scholarship_available);

        let updated = sqlx::query_as::<_, Course>(
            "UPDATE courses SET title = $2, description = $3, weeks = $4, tuition = $5, \
             minimum_skill = $6, scholarship_available = $7 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.weeks)
        .bind(course.tuition)
        .bind(course.minimum_skill.as_str())
        .bind(course.scholarship_available)
        .fetch_optional(&self.state.pool)
        .await?
        .ok_or_else(|| not_found("Course", id))?;

        tracing::info!("Updated course {}", id);
        self.notify(Operation::Update, updated.bootcamp_id).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid, user: &AuthUser) -> Result<(), ApiError> {
        let course = self.get(id).await?;
        BootcampService::new(self.state)
            .get_owned(course.bootcamp_id, user, "delete a course of")
            .await?;

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.state.pool)
            .await?;

        tracing::info!("Deleted course {}", id);
        self.notify(Operation::Delete, course.bootcamp_id).await;
        Ok(())
    }

    async fn notify(&self, operation: Operation, bootcamp_id: Uuid) {
        self.state
            .observers
            .notify(&MutationEvent::new(operation, COURSES, bootcamp_id))
            .await;
    }
}
