use async_trait::async_trait;

use super::Amenity;
use crate::domain::DomainResult;

#[async_trait]
pub trait AmenityRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Amenity>>;

    /// All amenities ordered by id
    async fn find_all(&self) -> DomainResult<Vec<Amenity>>;

    /// Insert a new amenity, assigning the next id
    async fn create(&self, name: &str) -> DomainResult<Amenity>;

    async fn count(&self) -> DomainResult<u64>;
}
