use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_new::new;
use kernel::model::{
    id::{BookingId, PaymentId},
    payment::{
        event::{CreatePayment, UpdatePaymentStatus},
        Payment, PaymentKind,
    },
};
use kernel::repository::payment::PaymentRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::payment::PaymentRow, ConnectionPool};

const PAYMENT_COLUMNS: &str = r#"
    payment_id,
    booking_id,
    amount,
    payment_type,
    status,
    gateway_payment_id,
    idempotence_key,
    created_at,
    captured_at
"#;

#[derive(new)]
pub struct PaymentRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl PaymentRepository for PaymentRepositoryImpl {
    async fn create(&self, event: CreatePayment) -> AppResult<Payment> {
        let row: PaymentRow = sqlx::query_as(&format!(
            r#"
                INSERT INTO payments
                (payment_id, booking_id, amount, payment_type, status,
                 idempotence_key, created_at, captured_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(event.payment_id)
        .bind(event.booking_id)
        .bind(event.amount)
        .bind(event.kind.as_ref())
        .bind(event.status.as_ref())
        .bind(event.idempotence_key)
        .bind(event.created_at)
        .bind(event.captured_at)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.try_into()
    }

    async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Option<Payment>> {
        sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE payment_id = $1"
        ))
        .bind(payment_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Payment::try_from)
        .transpose()
    }

    async fn find_by_gateway_id(&self, gateway_payment_id: &str) -> AppResult<Option<Payment>> {
        sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE gateway_payment_id = $1"
        ))
        .bind(gateway_payment_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Payment::try_from)
        .transpose()
    }

    async fn find_retryable(
        &self,
        booking_id: BookingId,
        kind: PaymentKind,
    ) -> AppResult<Option<Payment>> {
        sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
                SELECT {PAYMENT_COLUMNS}
                FROM payments
                WHERE booking_id = $1
                  AND payment_type = $2
                  AND status = 'pending'
                  AND gateway_payment_id IS NULL
                ORDER BY created_at DESC
                LIMIT 1
            "#
        ))
        .bind(booking_id)
        .bind(kind.as_ref())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Payment::try_from)
        .transpose()
    }

    async fn attach_gateway_payment(
        &self,
        payment_id: PaymentId,
        gateway_payment_id: &str,
    ) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE payments
                SET gateway_payment_id = $2
                WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .bind(gateway_payment_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified payment not found".into()));
        }
        Ok(())
    }

    async fn update_status(&self, event: UpdatePaymentStatus) -> AppResult<bool> {
        // 終端状態の行には触れない。captured_at は最初に記録した時刻を保持する
        let res = sqlx::query(
            r#"
                UPDATE payments
                SET
                    status = $2,
                    captured_at = COALESCE(captured_at, $3)
                WHERE payment_id = $1
                  AND status IN ('pending', 'waiting_for_capture')
                  AND status <> $2
            "#,
        )
        .bind(event.payment_id)
        .bind(event.status.as_ref())
        .bind(event.captured_at)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(res.rows_affected() > 0)
    }

    async fn find_stale_pending(&self, created_before: DateTime<Utc>) -> AppResult<Vec<Payment>> {
        sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
                SELECT {PAYMENT_COLUMNS}
                FROM payments
                WHERE status IN ('pending', 'waiting_for_capture')
                  AND created_at < $1
                ORDER BY created_at ASC
            "#
        ))
        .bind(created_before)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Payment::try_from)
        .collect()
    }
}
