//! Repository for the `user_profiles` table.

use fitback_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::profile::{UpdateProfile, UserProfile};

const COLUMNS: &str = "id, user_id, display_name, height_cm, weight_kg, chest_cm, waist_cm, \
                        hip_cm, upi_id, paypal_email, profile_completed, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    /// Make sure the user has a profile row. Idempotent.
    pub async fn ensure<'e>(executor: impl PgExecutor<'e>, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_profiles (user_id) VALUES ($1)
             ON CONFLICT ON CONSTRAINT uq_user_profiles_user_id DO NOTHING",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the profile, creating an empty one first if needed.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<UserProfile, sqlx::Error> {
        Self::ensure(pool, user_id).await?;
        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Replace the editable fields, creating the row if it does not exist.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdateProfile,
    ) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_profiles
                (user_id, display_name, height_cm, weight_kg, chest_cm, waist_cm, hip_cm,
                 upi_id, paypal_email, profile_completed)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT ON CONSTRAINT uq_user_profiles_user_id DO UPDATE SET
                display_name = EXCLUDED.display_name,
                height_cm = EXCLUDED.height_cm,
                weight_kg = EXCLUDED.weight_kg,
                chest_cm = EXCLUDED.chest_cm,
                waist_cm = EXCLUDED.waist_cm,
                hip_cm = EXCLUDED.hip_cm,
                upi_id = EXCLUDED.upi_id,
                paypal_email = EXCLUDED.paypal_email,
                profile_completed = EXCLUDED.profile_completed
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(&input.display_name)
            .bind(input.height_cm)
            .bind(input.weight_kg)
            .bind(input.chest_cm)
            .bind(input.waist_cm)
            .bind(input.hip_cm)
            .bind(&input.upi_id)
            .bind(&input.paypal_email)
            .bind(input.profile_completed)
            .fetch_one(pool)
            .await
    }
}
