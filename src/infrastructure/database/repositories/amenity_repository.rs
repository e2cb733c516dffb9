//! SeaORM implementation of AmenityRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryOrder, Set,
};

use crate::domain::{Amenity, AmenityRepository, DomainResult};
use crate::infrastructure::database::entities::amenity;

pub struct SeaOrmAmenityRepository {
    db: DatabaseConnection,
}

impl SeaOrmAmenityRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: amenity::Model) -> Amenity {
    Amenity {
        id: m.id,
        name: m.name,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl AmenityRepository for SeaOrmAmenityRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Amenity>> {
        let model = amenity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Amenity>> {
        let models = amenity::Entity::find()
            .order_by_asc(amenity::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn create(&self, name: &str) -> DomainResult<Amenity> {
        let now = Utc::now();
        let model = amenity::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(model_to_domain(model))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(amenity::Entity::find().count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_database;

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let repo = SeaOrmAmenityRepository::new(test_database().await);

        let pool = repo.create("Swimming Pool").await.unwrap();
        let court = repo.create("Tennis Court").await.unwrap();
        assert!(court.id > pool.id);

        let found = repo.find_by_id(pool.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Swimming Pool");
    }

    #[tokio::test]
    async fn find_all_is_ordered_by_id() {
        let repo = SeaOrmAmenityRepository::new(test_database().await);
        for name in ["Gym", "BBQ Area", "Conference Room"] {
            repo.create(name).await.unwrap();
        }

        let all = repo.find_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Gym", "BBQ Area", "Conference Room"]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let repo = SeaOrmAmenityRepository::new(test_database().await);
        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }
}
