//! Amenity browsing

use std::sync::Arc;

use crate::domain::{Amenity, DomainResult, RepositoryProvider};

pub struct AmenityService {
    repos: Arc<dyn RepositoryProvider>,
}

impl AmenityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Option<Amenity>> {
        self.repos.amenities().find_by_id(id).await
    }

    /// All amenities ordered by id
    pub async fn list(&self) -> DomainResult<Vec<Amenity>> {
        self.repos.amenities().find_all().await
    }
}
