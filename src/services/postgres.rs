use crate::core::PreferenceFilter;
use crate::models::{
    Dog, DogSize, Gender, MicrochipPreference, NewDog, PreferenceFields, Rating, RatingStatus,
    User, UserPreference,
};
use crate::services::store::{Store, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

const DOG_COLUMNS: &str = "id, name, image_filename, breed, age, gender, size, microchipped";
const RATING_COLUMNS: &str = "id, user_id, dog_id, status, blacklist";
const PREFERENCE_COLUMNS: &str = "id, user_id, age, gender, size, microchipped";

/// PostgreSQL-backed record store
///
/// Uniqueness of ratings per (user, dog) and preferences per user is
/// enforced by table constraints; upserts go through
/// `INSERT ... ON CONFLICT` so concurrent writers coalesce into one row.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

fn invalid(column: &str, value: &str) -> StoreError {
    StoreError::InvalidRow(format!("unexpected {} value '{}'", column, value))
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn dog_from_row(row: &PgRow) -> Result<Dog, StoreError> {
    let gender: String = row.try_get("gender")?;
    let size: String = row.try_get("size")?;

    Ok(Dog {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        image_filename: row.try_get("image_filename")?,
        breed: row.try_get("breed")?,
        age: row.try_get("age")?,
        gender: Gender::from_code(&gender).ok_or_else(|| invalid("gender", &gender))?,
        size: DogSize::from_code(&size).ok_or_else(|| invalid("size", &size))?,
        microchipped: row.try_get("microchipped")?,
    })
}

fn rating_from_row(row: &PgRow) -> Result<Rating, StoreError> {
    let status: String = row.try_get("status")?;

    Ok(Rating {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        dog_id: row.try_get("dog_id")?,
        status: RatingStatus::from_code(&status).ok_or_else(|| invalid("status", &status))?,
        blacklisted: row.try_get("blacklist")?,
    })
}

fn preference_from_row(row: &PgRow) -> Result<UserPreference, StoreError> {
    let microchipped: String = row.try_get("microchipped")?;

    Ok(UserPreference {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
        size: row.try_get("size")?,
        microchipped: MicrochipPreference::from_code(&microchipped),
    })
}

/// Map constraint violations onto store-level outcomes
fn classify(err: sqlx::Error, what: String) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(what);
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::NotFound(what);
        }
    }
    StoreError::SqlxError(err)
}

#[async_trait]
impl Store for PostgresClient {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let query = r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, username, password_hash, created_at
        "#;

        let row = sqlx::query(query)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, format!("username {}", username)))?;

        user_from_row(&row)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
        "#;

        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let query = r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_dog(&self, dog: NewDog) -> Result<Dog, StoreError> {
        let query = format!(
            r#"
            INSERT INTO dogs (name, image_filename, breed, age, gender, size, microchipped)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            DOG_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&dog.name)
            .bind(&dog.image_filename)
            .bind(&dog.breed)
            .bind(dog.age)
            .bind(dog.gender.code())
            .bind(dog.size.code())
            .bind(dog.microchipped)
            .fetch_one(&self.pool)
            .await?;

        let dog = dog_from_row(&row)?;
        tracing::info!("Added dog {}", dog);
        Ok(dog)
    }

    async fn get_dog(&self, dog_id: i64) -> Result<Option<Dog>, StoreError> {
        let query = format!("SELECT {} FROM dogs WHERE id = $1", DOG_COLUMNS);

        let row = sqlx::query(&query)
            .bind(dog_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(dog_from_row).transpose()
    }

    async fn delete_dog(&self, dog_id: i64) -> Result<bool, StoreError> {
        // user_dogs rows go with the dog via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM dogs WHERE id = $1")
            .bind(dog_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_dogs(&self, filter: &PreferenceFilter) -> Result<Vec<Dog>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM dogs
            WHERE ($1::text[] IS NULL OR gender = ANY($1))
              AND ($2::text[] IS NULL OR size = ANY($2))
              AND ($3::bool IS NULL OR microchipped = $3)
              AND ($4::int4[] IS NULL OR EXISTS (
                    SELECT 1
                    FROM UNNEST($4::int4[], $5::int4[]) AS bracket(low, high)
                    WHERE dogs.age BETWEEN bracket.low AND bracket.high
              ))
            ORDER BY id
            "#,
            DOG_COLUMNS
        );

        let (lows, highs) = match &filter.ages {
            Some(ages) => {
                let (lows, highs) = ages.bounds();
                (Some(lows), Some(highs))
            }
            None => (None, None),
        };

        let rows = sqlx::query(&query)
            .bind(filter.gender_codes())
            .bind(filter.size_codes())
            .bind(filter.microchipped)
            .bind(lows)
            .bind(highs)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(dog_from_row).collect()
    }

    async fn dogs_by_ids(&self, dog_ids: &[i64]) -> Result<Vec<Dog>, StoreError> {
        let query = format!(
            "SELECT {} FROM dogs WHERE id = ANY($1) ORDER BY id",
            DOG_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(dog_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(dog_from_row).collect()
    }

    async fn ratings_for_user(&self, user_id: i64) -> Result<Vec<Rating>, StoreError> {
        let query = format!(
            "SELECT {} FROM user_dogs WHERE user_id = $1 ORDER BY dog_id",
            RATING_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("User {} has {} ratings", user_id, rows.len());

        rows.iter().map(rating_from_row).collect()
    }

    async fn get_rating(&self, user_id: i64, dog_id: i64) -> Result<Option<Rating>, StoreError> {
        let query = format!(
            "SELECT {} FROM user_dogs WHERE user_id = $1 AND dog_id = $2",
            RATING_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(dog_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(rating_from_row).transpose()
    }

    async fn upsert_status(
        &self,
        user_id: i64,
        dog_id: i64,
        status: RatingStatus,
    ) -> Result<Rating, StoreError> {
        let query = format!(
            r#"
            INSERT INTO user_dogs (user_id, dog_id, status, blacklist)
            VALUES ($1, $2, $3, FALSE)
            ON CONFLICT (user_id, dog_id)
            DO UPDATE SET status = EXCLUDED.status
            RETURNING {}
            "#,
            RATING_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(dog_id)
            .bind(status.code())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, format!("dog {}", dog_id)))?;

        tracing::debug!("Rated dog {} as {} for user {}", dog_id, status, user_id);

        rating_from_row(&row)
    }

    async fn upsert_blacklist(
        &self,
        user_id: i64,
        dog_id: i64,
        blacklisted: bool,
    ) -> Result<Rating, StoreError> {
        let query = format!(
            r#"
            INSERT INTO user_dogs (user_id, dog_id, status, blacklist)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, dog_id)
            DO UPDATE SET blacklist = EXCLUDED.blacklist
            RETURNING {}
            "#,
            RATING_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(dog_id)
            .bind(RatingStatus::default().code())
            .bind(blacklisted)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, format!("dog {}", dog_id)))?;

        rating_from_row(&row)
    }

    async fn find_preference(&self, user_id: i64) -> Result<Option<UserPreference>, StoreError> {
        let query = format!(
            "SELECT {} FROM user_prefs WHERE user_id = $1",
            PREFERENCE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(preference_from_row).transpose()
    }

    async fn get_or_create_preference(
        &self,
        user_id: i64,
        defaults: &PreferenceFields,
    ) -> Result<UserPreference, StoreError> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let query = format!(
            r#"
            INSERT INTO user_prefs (user_id, age, gender, size, microchipped)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id)
            DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING {}
            "#,
            PREFERENCE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(&defaults.age)
            .bind(&defaults.gender)
            .bind(&defaults.size)
            .bind(defaults.microchipped.code())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, format!("user {}", user_id)))?;

        preference_from_row(&row)
    }

    async fn upsert_preference(
        &self,
        user_id: i64,
        fields: &PreferenceFields,
    ) -> Result<UserPreference, StoreError> {
        let query = format!(
            r#"
            INSERT INTO user_prefs (user_id, age, gender, size, microchipped)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id)
            DO UPDATE SET
                age = EXCLUDED.age,
                gender = EXCLUDED.gender,
                size = EXCLUDED.size,
                microchipped = EXCLUDED.microchipped
            RETURNING {}
            "#,
            PREFERENCE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(&fields.age)
            .bind(&fields.gender)
            .bind(&fields.size)
            .bind(fields.microchipped.code())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, format!("user {}", user_id)))?;

        tracing::debug!("Updated preferences for user {}", user_id);

        preference_from_row(&row)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
