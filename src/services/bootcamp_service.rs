use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Bootcamp, Location, CAREERS};
use crate::database::{Expansion, Page, QueryBuilder};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::auth::AuthUser;
use crate::services::validation::{not_found, slugify, trimmed, Validator, EMAIL_RE, URL_RE};
use crate::state::AppState;

/// Mean Earth radius used for radius search
pub const EARTH_RADIUS_MILES: f64 = 3963.2;

/// Haversine over coordinates = [lng, lat]. Binds: lat, lng, miles, earth radius.
/// The haversine term is clamped to 1; rounding overshoots it near antipodes.
const RADIUS_SQL: &str = "SELECT * FROM bootcamps WHERE \
     2 * $4::float8 * asin(LEAST(1.0::float8, sqrt( \
         power(sin(radians(coordinates[2] - $1::float8) / 2), 2) + \
         cos(radians($1::float8)) * cos(radians(coordinates[2])) * \
         power(sin(radians(coordinates[1] - $2::float8) / 2), 2) \
     ))) <= $3::float8 \
     ORDER BY created_at DESC, id ASC";

const NAME_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;
const PHONE_MAX: usize = 28;

/// Body of `POST /bootcamps` and `PUT /bootcamps/:id`. On update every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Geocoded into `location`, never stored
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl BootcampInput {
    fn validate(&self, creating: bool) -> Result<(), ApiError> {
        let name = trimmed(self.name.as_deref());
        let mut v = Validator::new();

        if creating || self.name.is_some() {
            v.required(name.as_deref(), "Please add a name");
        }
        v.max_len(name.as_deref(), NAME_MAX, "Name cannot be more than 50 characters");

        if creating || self.description.is_some() {
            v.required(self.description.as_deref(), "Please add a description");
        }
        v.max_len(self.description.as_deref(), DESCRIPTION_MAX, "Description cannot be more than 500 characters")
            .pattern(self.website.as_deref(), &URL_RE, "Please use a valid URL with HTTP or HTTPS")
            .max_len(self.phone.as_deref(), PHONE_MAX, "Phone number cannot be longer than 28 characters")
            .pattern(self.email.as_deref(), &EMAIL_RE, "Please add a valid email");

        if creating || self.address.is_some() {
            v.required(self.address.as_deref(), "Please add an address");
        }

        match &self.careers {
            Some(careers) => {
                v.check(!careers.is_empty(), "Please add at least one career");
                for career in careers {
                    v.check(
                        CAREERS.contains(&career.as_str()),
                        &format!("'{}' is not a valid career", career),
                    );
                }
            }
            None => {
                v.check(!creating, "Please add at least one career");
            }
        }

        v.finish()
    }
}

fn ensure_owner(bootcamp: &Bootcamp, user: &AuthUser, action: &str) -> Result<(), ApiError> {
    if bootcamp.is_owned_by(user.id) || user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "User {} is not authorized to {} this bootcamp",
            user.id, action
        )))
    }
}

/// Upload received from a multipart `file` field
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// `photo_<id><ext>`, extension taken from the client's file name
    fn stored_name(&self, bootcamp_id: Uuid) -> String {
        let ext = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        format!("photo_{}{}", bootcamp_id, ext)
    }
}

pub struct BootcampService<'a> {
    state: &'a AppState,
}

impl<'a> BootcampService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self, data: &FilterData) -> Result<Page, ApiError> {
        Ok(QueryBuilder::<Bootcamp>::new(&Bootcamp::SCHEMA)
            .expand(Expansion::Courses)
            .page(&self.state.pool, data)
            .await?)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Bootcamp>, ApiError> {
        Ok(sqlx::query_as::<_, Bootcamp>("SELECT * FROM bootcamps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.state.pool)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Bootcamp, ApiError> {
        self.find(id).await?.ok_or_else(|| not_found("Bootcamp", id))
    }

    /// Load a bootcamp the caller may modify
    pub async fn get_owned(&self, id: Uuid, user: &AuthUser, action: &str) -> Result<Bootcamp, ApiError> {
        let bootcamp = self.get(id).await?;
        ensure_owner(&bootcamp, user, action)?;
        Ok(bootcamp)
    }

    pub async fn create(&self, user: &AuthUser, input: BootcampInput) -> Result<Bootcamp, ApiError> {
        input.validate(true)?;

        if !user.is_admin() {
            let (published,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bootcamps WHERE user_id = $1")
                .bind(user.id)
                .fetch_one(&self.state.pool)
                .await?;
            if published > 0 {
                return Err(ApiError::validation_error(format!(
                    "The user with ID {} has already published a bootcamp",
                    user.id
                )));
            }
        }

        let address = input.address.as_deref().unwrap_or_default();
        let location = self.state.geocoder.geocode(address).await?.into_location();
        let name = trimmed(input.name.as_deref()).unwrap_or_default();

        let bootcamp = sqlx::query_as::<_, Bootcamp>(
            "INSERT INTO bootcamps (id, user_id, name, slug, description, website, phone, email, \
             location_type, coordinates, formatted_address, street, city, state, zipcode, country, \
             careers, housing, job_assistance, job_guarantee, accept_gi) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(&name)
        .bind(slugify(&name))
        .bind(&input.description)
        .bind(trimmed(input.website.as_deref()))
        .bind(trimmed(input.phone.as_deref()))
        .bind(trimmed(input.email.as_deref()))
        .bind(&location.location_type)
        .bind(&location.coordinates)
        .bind(&location.formatted_address)
        .bind(&location.street)
        .bind(&location.city)
        .bind(&location.state)
        .bind(&location.zipcode)
        .bind(&location.country)
        .bind(input.careers.clone().unwrap_or_default())
        .bind(input.housing.unwrap_or(false))
        .bind(input.job_assistance.unwrap_or(false))
        .bind(input.job_guarantee.unwrap_or(false))
        .bind(input.accept_gi.unwrap_or(false))
        .fetch_one(&self.state.pool)
        .await?;

        tracing::info!("Created bootcamp {} ({}) for user {}", bootcamp.id, bootcamp.slug, user.id);
        Ok(bootcamp)
    }

    /// Re-slugs when the name changes and re-geocodes when an address is supplied
    pub async fn update(&self, id: Uuid, user: &AuthUser, input: BootcampInput) -> Result<Bootcamp, ApiError> {
        let mut bootcamp = self.get_owned(id, user, "update").await?;
        input.validate(false)?;

        if let Some(name) = trimmed(input.name.as_deref()) {
            bootcamp.slug = slugify(&name);
            bootcamp.name = name;
        }
        if let Some(description) = input.description {
            bootcamp.description = description;
        }
        if input.website.is_some() {
            bootcamp.website = trimmed(input.website.as_deref());
        }
        if input.phone.is_some() {
            bootcamp.phone = trimmed(input.phone.as_deref());
        }
        if input.email.is_some() {
            bootcamp.email = trimmed(input.email.as_deref());
        }
        if let Some(address) = input.address.as_deref() {
            bootcamp.location = self.state.geocoder.geocode(address).await?.into_location();
        }
        if let Some(careers) = input.careers {
            bootcamp.careers = careers;
        }
        bootcamp.housing = input.housing.unwrap_or(bootcamp.housing);
        bootcamp.job_assistance = input.job_assistance.unwrap_or(bootcamp.job_assistance);
        bootcamp.job_guarantee = input.job_guarantee.unwrap_or(bootcamp.job_guarantee);
        bootcamp.accept_gi = input.accept_gi.unwrap_or(bootcamp.accept_gi);

        let Location { location_type, coordinates, formatted_address, street, city, state, zipcode, country } =
            &bootcamp.location;

        let updated = sqlx::query_as::<_, Bootcamp>(
            "UPDATE bootcamps SET name = $2, slug = $3, description = $4, website = $5, phone = $6, email = $7, \
             location_type = $8, coordinates = $9, formatted_address = $10, street = $11, city = $12, \
             state = $13, zipcode = $14, country = $15, careers = $16, housing = $17, job_assistance = $18, \
             job_guarantee = $19, accept_gi = $20 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&bootcamp.name)
        .bind(&bootcamp.slug)
        .bind(&bootcamp.description)
        .bind(&bootcamp.website)
        .bind(&bootcamp.phone)
        .bind(&bootcamp.email)
        .bind(location_type)
        .bind(coordinates)
        .bind(formatted_address)
        .bind(street)
        .bind(city)
        .bind(state)
        .bind(zipcode)
        .bind(country)
        .bind(&bootcamp.careers)
        .bind(bootcamp.housing)
        .bind(bootcamp.job_assistance)
        .bind(bootcamp.job_guarantee)
        .bind(bootcamp.accept_gi)
        .fetch_optional(&self.state.pool)
        .await?
        .ok_or_else(|| not_found("Bootcamp", id))?;

        tracing::info!("Updated bootcamp {}", id);
        Ok(updated)
    }

    /// Courses and reviews go with it (ON DELETE CASCADE)
    pub async fn delete(&self, id: Uuid, user: &AuthUser) -> Result<(), ApiError> {
        self.get_owned(id, user, "delete").await?;
        sqlx::query("DELETE FROM bootcamps WHERE id = $1")
            .bind(id)
            .execute(&self.state.pool)
            .await?;
        tracing::info!("Deleted bootcamp {}", id);
        Ok(())
    }

    /// Bootcamps within `distance` miles of the geocoded `zipcode`
    pub async fn within_radius(&self, zipcode: &str, distance: &str) -> Result<Vec<Bootcamp>, ApiError> {
        let distance: f64 = distance
            .parse()
            .ok()
            .filter(|d: &f64| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| ApiError::validation_error("Distance must be a non-negative number of miles"))?;

        let point = self.state.geocoder.geocode(zipcode).await?;

        let bootcamps = sqlx::query_as::<_, Bootcamp>(RADIUS_SQL)
            .bind(point.latitude)
            .bind(point.longitude)
            .bind(distance)
            .bind(EARTH_RADIUS_MILES)
            .fetch_all(&self.state.pool)
            .await?;

        Ok(bootcamps)
    }

    /// Store an image as `photo_<id><ext>` under the upload directory and record its name
    pub async fn upload_photo(&self, id: Uuid, user: &AuthUser, file: UploadedFile) -> Result<String, ApiError> {
        self.get_owned(id, user, "update").await?;

        let max = self.state.config.uploads.max_file_upload;
        Validator::new()
            .check(file.content_type.starts_with("image"), "Please upload an image file")
            .check(file.bytes.len() <= max, &format!("Please upload an image less than {} bytes", max))
            .finish()?;

        let file_name = file.stored_name(id);
        let dir = &self.state.config.uploads.file_upload_path;
        let stored = match tokio::fs::create_dir_all(dir).await {
            Ok(()) => tokio::fs::write(dir.join(&file_name), &file.bytes).await,
            Err(e) => Err(e),
        };
        stored.map_err(|e| {
            tracing::error!("Failed to store upload {}: {}", file_name, e);
            ApiError::upstream("Problem with file upload")
        })?;

        sqlx::query("UPDATE bootcamps SET photo = $2 WHERE id = $1")
            .bind(id)
            .bind(&file_name)
            .execute(&self.state.pool)
            .await?;

        tracing::info!("Stored photo {} for bootcamp {}", file_name, id);
        Ok(file_name)
    }
}
