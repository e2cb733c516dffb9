//! Unified access to all per-aggregate repositories

use super::amenity::AmenityRepository;
use super::reservation::ReservationRepository;
use super::user::UserRepositoryInterface;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let pool = repos.amenities().find_by_id(1).await?;
///     let slots = repos.reservations().find_by_user_id("u-1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepositoryInterface;
    fn amenities(&self) -> &dyn AmenityRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
}
