//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;

use crate::domain::{DomainResult, Reservation, ReservationRepository};
use crate::infrastructure::database::entities::reservation;

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> Reservation {
    Reservation {
        id: m.id,
        amenity_id: m.amenity_id,
        user_id: m.user_id,
        start_time: m.start_time,
        end_time: m.end_time,
        date: m.date,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn save(&self, r: Reservation) -> DomainResult<()> {
        debug!(reservation_id = %r.id, amenity_id = r.amenity_id, "Saving reservation");

        let model = reservation::ActiveModel {
            id: Set(r.id),
            amenity_id: Set(r.amenity_id),
            user_id: Set(r.user_id),
            start_time: Set(r.start_time),
            end_time: Set(r.end_time),
            date: Set(r.date),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_amenity_and_date(
        &self,
        amenity_id: i32,
        date: NaiveDate,
    ) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::AmenityId.eq(amenity_id))
            .filter(reservation::Column::Date.eq(date))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_asc(reservation::Column::Date)
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(reservation::Entity::find().count(&self.db).await?)
    }
}
