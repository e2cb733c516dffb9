//! In-memory repositories for development and testing

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;

use crate::domain::{
    Amenity, AmenityRepository, CreateUserDto, DomainError, DomainResult, RepositoryProvider,
    Reservation, ReservationRepository, User, UserRepositoryInterface,
};

/// `DashMap`-backed implementation of every repository
pub struct InMemoryRepositoryProvider {
    users: DashMap<String, User>,
    amenities: DashMap<i32, Amenity>,
    reservations: DashMap<String, Reservation>,
    amenity_counter: AtomicI32,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            amenities: DashMap::new(),
            reservations: DashMap::new(),
            amenity_counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn users(&self) -> &dyn UserRepositoryInterface {
        self
    }

    fn amenities(&self) -> &dyn AmenityRepository {
        self
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        self
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryRepositoryProvider {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        if self.users.iter().any(|u| u.username == dto.username) {
            return Err(DomainError::Conflict("Username already exists".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: dto.username,
            password_hash: dto.password_hash,
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone()))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }
}

#[async_trait]
impl AmenityRepository for InMemoryRepositoryProvider {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Amenity>> {
        Ok(self.amenities.get(&id).map(|a| a.value().clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Amenity>> {
        let mut all: Vec<Amenity> = self.amenities.iter().map(|a| a.value().clone()).collect();
        all.sort_by_key(|a| a.id);
        Ok(all)
    }

    async fn create(&self, name: &str) -> DomainResult<Amenity> {
        let now = Utc::now();
        let amenity = Amenity {
            id: self.amenity_counter.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.amenities.insert(amenity.id, amenity.clone());
        Ok(amenity)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.amenities.len() as u64)
    }
}

#[async_trait]
impl ReservationRepository for InMemoryRepositoryProvider {
    async fn save(&self, reservation: Reservation) -> DomainResult<()> {
        if self.reservations.contains_key(&reservation.id) {
            return Err(DomainError::Conflict(format!(
                "Reservation {} already exists",
                reservation.id
            )));
        }
        self.reservations.insert(reservation.id.clone(), reservation);
        Ok(())
    }

    async fn find_by_amenity_and_date(
        &self,
        amenity_id: i32,
        date: NaiveDate,
    ) -> DomainResult<Vec<Reservation>> {
        let mut found: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| r.amenity_id == amenity_id && r.date == date)
            .map(|r| r.value().clone())
            .collect();
        found.sort_by_key(|r| r.start_time);
        Ok(found)
    }

    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Vec<Reservation>> {
        let mut found: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        found.sort_by_key(|r| (r.date, r.start_time));
        Ok(found)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.reservations.len() as u64)
    }
}
