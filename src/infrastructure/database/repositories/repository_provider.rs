//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{
    AmenityRepository, RepositoryProvider, ReservationRepository, UserRepositoryInterface,
};

use super::amenity_repository::SeaOrmAmenityRepository;
use super::reservation_repository::SeaOrmReservationRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let amenity = repos.amenities().find_by_id(1).await?;
/// let bookings = repos.reservations().find_by_user_id(&user.id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    amenities: SeaOrmAmenityRepository,
    reservations: SeaOrmReservationRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            amenities: SeaOrmAmenityRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepositoryInterface {
        &self.users
    }

    fn amenities(&self) -> &dyn AmenityRepository {
        &self.amenities
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }
}
