use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{id::ServiceId, service::Service},
    repository::service::ServiceRepository,
};
use shared::error::{AppError, AppResult};

use crate::database::{model::service::ServiceRow, ConnectionPool};

#[derive(new)]
pub struct ServiceRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ServiceRepository for ServiceRepositoryImpl {
    async fn find_active(&self) -> AppResult<Vec<Service>> {
        sqlx::query_as::<_, ServiceRow>(
            r#"
                SELECT service_id, name, description, service_type, price, quantity, is_active
                FROM services
                WHERE is_active
                ORDER BY service_type, name
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Service::try_from)
        .collect()
    }

    async fn find_by_id(&self, service_id: ServiceId) -> AppResult<Option<Service>> {
        sqlx::query_as::<_, ServiceRow>(
            r#"
                SELECT service_id, name, description, service_type, price, quantity, is_active
                FROM services
                WHERE service_id = $1
            "#,
        )
        .bind(service_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Service::try_from)
        .transpose()
    }

    async fn find_recommended(&self, capacity: i32) -> AppResult<Vec<Service>> {
        // 娯楽・リラクゼーション系で 2000 以上、収容人数の半分以上に対応できるもの
        sqlx::query_as::<_, ServiceRow>(
            r#"
                SELECT service_id, name, description, service_type, price, quantity, is_active
                FROM services
                WHERE is_active
                  AND service_type IN ('entertainment', 'relax')
                  AND price >= 2000
                  AND quantity * 2 >= $1
                ORDER BY service_type, name
            "#,
        )
        .bind(capacity)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Service::try_from)
        .collect()
    }
}
