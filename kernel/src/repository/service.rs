use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{id::ServiceId, service::Service};

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_active(&self) -> AppResult<Vec<Service>>;
    async fn find_by_id(&self, service_id: ServiceId) -> AppResult<Option<Service>>;
    // 指定人数のグループ向けのおすすめサービス
    async fn find_recommended(&self, capacity: i32) -> AppResult<Vec<Service>>;
}
