use super::IProfileRepo;
use medication_reminders_domain::{Profile, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresProfileRepo {
    pool: PgPool,
}

impl PostgresProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRaw {
    user_uid: Uuid,
    full_name: Option<String>,
    email: Option<String>,
}

impl From<ProfileRaw> for Profile {
    fn from(raw: ProfileRaw) -> Self {
        Profile {
            id: raw.user_uid.into(),
            full_name: raw.full_name,
            email: raw.email,
        }
    }
}

#[async_trait::async_trait]
impl IProfileRepo for PostgresProfileRepo {
    async fn insert(&self, profile: &Profile) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles(user_uid, full_name, email)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(profile.id.inner_ref())
        .bind(&profile.full_name)
        .bind(&profile.email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, ProfileRaw>(
            r#"
            SELECT p.user_uid, p.full_name, p.email FROM profiles AS p
            WHERE p.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile.map(|p| p.into()))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, ProfileRaw>(
            r#"
            SELECT p.user_uid, p.full_name, p.email FROM profiles AS p
            ORDER BY p.full_name NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles.into_iter().map(|p| p.into()).collect())
    }
}
