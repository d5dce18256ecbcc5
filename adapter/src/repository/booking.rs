use std::collections::HashMap;

use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    booking::{event::CreateBooking, pricing::BookingRejection, Booking, BookingService},
    id::{BookingId, ServiceId, UserId},
};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};
use uuid::Uuid;

use crate::database::{
    model::booking::{BookingRow, BookingServiceRow},
    ConnectionPool,
};

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
    // 期間が重なる予約を拒否するかどうか
    reject_overlapping: bool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        let mut tx = self.db.begin().await?;

        // 重複チェックと登録の間に他の予約が割り込まないようにする
        self.set_transaction_serializable(&mut tx).await?;

        {
            let house: Option<(bool,)> =
                sqlx::query_as("SELECT is_active FROM houses WHERE house_id = $1")
                    .bind(event.house_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;

            match house {
                None => return Err(BookingRejection::InvalidHouse.into()),
                Some((false,)) => return Err(BookingRejection::HouseUnavailable.into()),
                Some((true,)) => {}
            }

            // 既存予約と [check_in, check_out) が重なるか
            if self.reject_overlapping {
                let overlap: Option<(Uuid,)> = sqlx::query_as(
                    r#"
                        SELECT booking_id
                        FROM bookings
                        WHERE house_id = $1
                          AND check_in < $3
                          AND $2 < check_out
                        LIMIT 1
                    "#,
                )
                .bind(event.house_id)
                .bind(event.check_in)
                .bind(event.check_out)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;

                if overlap.is_some() {
                    return Err(BookingRejection::DatesUnavailable.into());
                }
            }
        }

        let mut service_ids: Vec<Uuid> = event.service_ids.iter().map(|id| id.raw()).collect();
        service_ids.sort_unstable();
        service_ids.dedup();

        if !service_ids.is_empty() {
            let (active,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM services WHERE service_id = ANY($1) AND is_active",
            )
            .bind(&service_ids)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if active != service_ids.len() as i64 {
                return Err(AppError::UnprocessableEntity(
                    "one or more selected services are not available".into(),
                ));
            }
        }

        let booking_id = BookingId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO bookings
                (booking_id, house_id, user_id, check_in, check_out, guests, total_cost, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking_id)
        .bind(event.house_id)
        .bind(event.booked_by)
        .bind(event.check_in)
        .bind(event.check_out)
        .bind(event.guests)
        .bind(event.total_cost)
        .bind(event.booked_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        if !service_ids.is_empty() {
            sqlx::query(
                r#"
                    INSERT INTO booking_services (booking_id, service_id)
                    SELECT $1, UNNEST($2::UUID[])
                "#,
            )
            .bind(booking_id)
            .bind(&service_ids)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            %booking_id,
            house_id = %event.house_id,
            user_id = %event.booked_by,
            total_cost = %event.total_cost,
            "Booking created"
        );
        Ok(booking_id)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "{} WHERE b.booking_id = $1",
            BOOKING_SELECT
        ))
        .bind(booking_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        match row {
            Some(row) => Ok(self.with_services(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "{} WHERE b.user_id = $1 ORDER BY b.check_in DESC, b.created_at DESC",
            BOOKING_SELECT
        ))
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        self.with_services(rows).await
    }
}

const BOOKING_SELECT: &str = r#"
    SELECT
        b.booking_id,
        b.user_id,
        b.check_in,
        b.check_out,
        b.guests,
        b.total_cost,
        b.created_at,
        h.house_id,
        h.name AS house_name,
        h.price_per_night
    FROM bookings AS b
    INNER JOIN houses AS h ON b.house_id = h.house_id
"#;

impl BookingRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // 付帯サービスはまとめて一回のクエリで取得する
    async fn with_services(&self, rows: Vec<BookingRow>) -> AppResult<Vec<Booking>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.booking_id.raw()).collect();

        let service_rows: Vec<BookingServiceRow> = sqlx::query_as(
            r#"
                SELECT bs.booking_id, s.service_id, s.name, s.price
                FROM booking_services AS bs
                INNER JOIN services AS s ON bs.service_id = s.service_id
                WHERE bs.booking_id = ANY($1)
                ORDER BY s.name ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut services: HashMap<BookingId, Vec<BookingService>> = HashMap::new();
        for row in service_rows {
            services
                .entry(row.booking_id)
                .or_default()
                .push(BookingService::from(row));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let attached = services.remove(&row.booking_id).unwrap_or_default();
                row.into_booking(attached)
            })
            .collect())
    }
}
