//! Reservation repository interface

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::Reservation;
use crate::domain::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Save a new reservation
    async fn save(&self, reservation: Reservation) -> DomainResult<()>;

    /// Reservations of an amenity on one calendar day, by start time ascending
    async fn find_by_amenity_and_date(
        &self,
        amenity_id: i32,
        date: NaiveDate,
    ) -> DomainResult<Vec<Reservation>>;

    /// Reservations of a user, ordered by date then start time
    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Vec<Reservation>>;

    async fn count(&self) -> DomainResult<u64>;
}
