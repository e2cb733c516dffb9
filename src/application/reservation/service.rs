//! Reservation service
//!
//! Joins reservations against amenity lookups and shapes them for the
//! by-day and by-user views.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::views::{DayBookings, ReservationBooking, ReservationInfo};
use crate::domain::reservation::model::validate_slot;
use crate::domain::{DomainError, DomainResult, RepositoryProvider, Reservation};
use crate::shared::time::{format_date, format_minutes};

/// Amenity name shown when a reservation points at a missing amenity
pub const UNKNOWN_AMENITY: &str = "Unknown";

/// Request to book a slot for the calling user
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub amenity_id: i32,
    pub date: NaiveDate,
    pub start_time: i32,
    pub end_time: i32,
}

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    /// Serializes overlap check and insert per amenity
    booking_locks: DashMap<i32, Arc<Mutex<()>>>,
}

impl ReservationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            booking_locks: DashMap::new(),
        }
    }

    fn booking_lock(&self, amenity_id: i32) -> Arc<Mutex<()>> {
        self.booking_locks
            .entry(amenity_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Reservations of one amenity on one day, earliest first.
    ///
    /// An unknown amenity yields an empty list.
    pub async fn reservations_by_amenity_and_date(
        &self,
        amenity_id: i32,
        date: NaiveDate,
    ) -> DomainResult<Vec<ReservationBooking>> {
        let reservations = self
            .repos
            .reservations()
            .find_by_amenity_and_date(amenity_id, date)
            .await?;

        let Some(amenity) = self.repos.amenities().find_by_id(amenity_id).await? else {
            debug!(amenity_id, "Amenity not found, returning no reservations");
            return Ok(Vec::new());
        };

        Ok(reservations
            .into_iter()
            .map(|r| ReservationBooking {
                start_time: format_minutes(r.start_time),
                duration: r.duration(),
                reservation_id: r.id,
                user_id: r.user_id,
                amenity_name: amenity.name.clone(),
            })
            .collect())
    }

    /// A user's reservations grouped by calendar day, days ascending.
    pub async fn user_bookings_grouped_by_day(
        &self,
        user_id: &str,
    ) -> DomainResult<Vec<DayBookings>> {
        let reservations = self.repos.reservations().find_by_user_id(user_id).await?;

        let amenity_ids: BTreeSet<i32> = reservations.iter().map(|r| r.amenity_id).collect();
        let mut amenity_names: HashMap<i32, String> = HashMap::with_capacity(amenity_ids.len());
        for id in amenity_ids {
            if let Some(amenity) = self.repos.amenities().find_by_id(id).await? {
                amenity_names.insert(id, amenity.name);
            }
        }

        let mut by_day: BTreeMap<NaiveDate, Vec<ReservationInfo>> = BTreeMap::new();
        for r in reservations {
            let amenity_name = amenity_names
                .get(&r.amenity_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_AMENITY.to_string());
            by_day.entry(r.date).or_default().push(ReservationInfo {
                start_time: format_minutes(r.start_time),
                duration: r.duration(),
                reservation_id: r.id,
                amenity_name,
            });
        }

        Ok(by_day
            .into_iter()
            .map(|(date, reservations)| DayBookings {
                date: format_date(date),
                reservations,
            })
            .collect())
    }

    /// Book a slot. The amenity must exist and the slot must not overlap
    /// another reservation of the same amenity that day.
    ///
    /// Bookings of one amenity are serialized so concurrent requests for
    /// the same slot cannot both pass the overlap check.
    pub async fn book(&self, user_id: &str, booking: NewBooking) -> DomainResult<Reservation> {
        validate_slot(booking.start_time, booking.end_time)?;

        if self
            .repos
            .amenities()
            .find_by_id(booking.amenity_id)
            .await?
            .is_none()
        {
            return Err(DomainError::not_found("Amenity", "id", booking.amenity_id));
        }

        let lock = self.booking_lock(booking.amenity_id);
        let _guard = lock.lock().await;

        let taken = self
            .repos
            .reservations()
            .find_by_amenity_and_date(booking.amenity_id, booking.date)
            .await?;
        if taken
            .iter()
            .any(|r| r.overlaps(booking.start_time, booking.end_time))
        {
            return Err(DomainError::Conflict(format!(
                "Time slot {}-{} on {} overlaps an existing reservation",
                format_minutes(booking.start_time),
                format_minutes(booking.end_time),
                format_date(booking.date)
            )));
        }

        let reservation = Reservation::new(
            booking.amenity_id,
            user_id,
            booking.start_time,
            booking.end_time,
            booking.date,
        )?;
        self.repos.reservations().save(reservation.clone()).await?;

        metrics::counter!("reservations_booked_total").increment(1);
        info!(
            reservation_id = %reservation.id,
            amenity_id = reservation.amenity_id,
            user_id,
            date = %reservation.date,
            "Reservation booked"
        );
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryRepositoryProvider;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    async fn seeded() -> (Arc<InMemoryRepositoryProvider>, ReservationService) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        repos.amenities().create("Swimming Pool").await.unwrap(); // id 1
        repos.amenities().create("Tennis Court").await.unwrap(); // id 2
        let svc = ReservationService::new(repos.clone());
        (repos, svc)
    }

    async fn insert(
        repos: &InMemoryRepositoryProvider,
        amenity_id: i32,
        user_id: &str,
        start: i32,
        end: i32,
        date: NaiveDate,
    ) -> String {
        let r = Reservation::new(amenity_id, user_id, start, end, date).unwrap();
        let id = r.id.clone();
        repos.reservations().save(r).await.unwrap();
        id
    }

    #[tokio::test]
    async fn by_day_formats_and_orders_reservations() {
        let (repos, svc) = seeded().await;
        let second = insert(&repos, 1, "user-2", 600, 660, day(15)).await;
        let first = insert(&repos, 1, "user-1", 480, 540, day(15)).await;
        insert(&repos, 1, "user-1", 480, 540, day(16)).await;
        insert(&repos, 2, "user-1", 480, 540, day(15)).await;

        let result = svc.reservations_by_amenity_and_date(1, day(15)).await.unwrap();

        assert_eq!(
            result,
            vec![
                ReservationBooking {
                    reservation_id: first,
                    user_id: "user-1".into(),
                    start_time: "08:00".into(),
                    duration: 60,
                    amenity_name: "Swimming Pool".into(),
                },
                ReservationBooking {
                    reservation_id: second,
                    user_id: "user-2".into(),
                    start_time: "10:00".into(),
                    duration: 60,
                    amenity_name: "Swimming Pool".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn by_day_unknown_amenity_is_empty() {
        let (repos, svc) = seeded().await;
        insert(&repos, 999, "user-1", 480, 540, day(15)).await;

        let result = svc.reservations_by_amenity_and_date(999, day(15)).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn by_day_without_reservations_is_empty() {
        let (_repos, svc) = seeded().await;
        let result = svc.reservations_by_amenity_and_date(1, day(15)).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn by_day_pads_single_digit_times() {
        let (repos, svc) = seeded().await;
        insert(&repos, 2, "user-1", 30, 60, day(15)).await;

        let result = svc.reservations_by_amenity_and_date(2, day(15)).await.unwrap();
        assert_eq!(result[0].start_time, "00:30");
        assert_eq!(result[0].duration, 30);
    }

    #[tokio::test]
    async fn by_user_groups_by_day_ascending() {
        let (repos, svc) = seeded().await;
        let r3 = insert(&repos, 1, "user-1", 720, 780, day(16)).await;
        let r1 = insert(&repos, 1, "user-1", 480, 540, day(15)).await;
        let r2 = insert(&repos, 2, "user-1", 600, 660, day(15)).await;
        insert(&repos, 1, "user-2", 300, 360, day(14)).await;

        let result = svc.user_bookings_grouped_by_day("user-1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].date, "2024-01-15");
        assert_eq!(
            result[0].reservations,
            vec![
                ReservationInfo {
                    reservation_id: r1,
                    start_time: "08:00".into(),
                    duration: 60,
                    amenity_name: "Swimming Pool".into(),
                },
                ReservationInfo {
                    reservation_id: r2,
                    start_time: "10:00".into(),
                    duration: 60,
                    amenity_name: "Tennis Court".into(),
                },
            ]
        );
        assert_eq!(result[1].date, "2024-01-16");
        assert_eq!(result[1].reservations.len(), 1);
        assert_eq!(result[1].reservations[0].reservation_id, r3);
        assert_eq!(result[1].reservations[0].start_time, "12:00");
    }

    #[tokio::test]
    async fn by_user_missing_amenity_is_unknown() {
        let (repos, svc) = seeded().await;
        insert(&repos, 42, "user-1", 480, 540, day(15)).await;

        let result = svc.user_bookings_grouped_by_day("user-1").await.unwrap();
        assert_eq!(result[0].reservations[0].amenity_name, UNKNOWN_AMENITY);
    }

    #[tokio::test]
    async fn by_user_without_reservations_is_empty() {
        let (_repos, svc) = seeded().await;
        assert!(svc.user_bookings_grouped_by_day("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn book_saves_reservation() {
        let (repos, svc) = seeded().await;
        let booking = NewBooking {
            amenity_id: 1,
            date: day(20),
            start_time: 540,
            end_time: 600,
        };

        let r = svc.book("user-1", booking).await.unwrap();
        assert_eq!(r.user_id, "user-1");
        assert_eq!(r.duration(), 60);

        let stored = repos.reservations().find_by_user_id("user-1").await.unwrap();
        assert_eq!(stored, vec![r]);
    }

    #[tokio::test]
    async fn book_rejects_overlap_on_same_amenity_and_day() {
        let (repos, svc) = seeded().await;
        insert(&repos, 1, "user-2", 540, 600, day(20)).await;

        let clash = NewBooking {
            amenity_id: 1,
            date: day(20),
            start_time: 570,
            end_time: 630,
        };
        let err = svc.book("user-1", clash).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let adjacent = NewBooking {
            amenity_id: 1,
            date: day(20),
            start_time: 600,
            end_time: 660,
        };
        assert!(svc.book("user-1", adjacent).await.is_ok());

        let other_amenity = NewBooking {
            amenity_id: 2,
            date: day(20),
            start_time: 540,
            end_time: 600,
        };
        assert!(svc.book("user-1", other_amenity).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bookings_of_one_slot_store_exactly_one() {
        use crate::domain::CreateUserDto;
        use crate::infrastructure::database::test_database;
        use crate::infrastructure::SeaOrmRepositoryProvider;

        let repos = Arc::new(SeaOrmRepositoryProvider::new(test_database().await));
        let amenity_id = repos.amenities().create("Swimming Pool").await.unwrap().id;
        let user = repos
            .users()
            .create_user(CreateUserDto {
                username: "john_doe".into(),
                password_hash: "x".into(),
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "john.doe@example.com".into(),
            })
            .await
            .unwrap();
        let svc = Arc::new(ReservationService::new(repos.clone()));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let svc = svc.clone();
            let user_id = user.id.clone();
            tasks.push(tokio::spawn(async move {
                svc.book(
                    &user_id,
                    NewBooking {
                        amenity_id,
                        date: day(1),
                        start_time: 540,
                        end_time: 600,
                    },
                )
                .await
            }));
        }

        let mut booked = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => booked += 1,
                Err(e) => assert!(matches!(e, DomainError::Conflict(_)), "{e}"),
            }
        }
        assert_eq!(booked, 1);

        let stored = repos
            .reservations()
            .find_by_amenity_and_date(amenity_id, day(1))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn book_rejects_unknown_amenity_and_bad_slot() {
        let (_repos, svc) = seeded().await;

        let unknown = NewBooking {
            amenity_id: 999,
            date: day(20),
            start_time: 540,
            end_time: 600,
        };
        assert!(matches!(
            svc.book("user-1", unknown).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));

        let inverted = NewBooking {
            amenity_id: 1,
            date: day(20),
            start_time: 600,
            end_time: 540,
        };
        assert!(matches!(
            svc.book("user-1", inverted).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }
}
