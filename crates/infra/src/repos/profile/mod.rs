mod inmemory;
mod postgres;

pub use inmemory::InMemoryProfileRepo;
use medication_reminders_domain::{Profile, ID};
pub use postgres::PostgresProfileRepo;

#[async_trait::async_trait]
pub trait IProfileRepo: Send + Sync {
    async fn insert(&self, profile: &Profile) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<Profile>>;
    async fn find_all(&self) -> anyhow::Result<Vec<Profile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn it_finds_profile_by_user_id() {
        let repo = InMemoryProfileRepo::new();
        let mut profile = Profile::new(ID::new());
        profile.email = Some("ada@example.com".into());
        repo.insert(&profile).await.expect("To insert profile");
        repo.insert(&Profile::new(ID::new())).await.unwrap();

        let found = repo.find(&profile.id).await.unwrap();
        assert_eq!(found, Some(profile));
        assert!(repo.find(&ID::new()).await.unwrap().is_none());
        assert_eq!(repo.find_all().await.unwrap().len(), 2);
    }
}
