use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    house::{
        event::{CreateHouse, UpdateHouse},
        House, HouseListOptions,
    },
    id::HouseId,
    list::PaginatedList,
};

#[async_trait]
pub trait HouseRepository: Send + Sync {
    async fn create(&self, event: CreateHouse) -> AppResult<HouseId>;
    async fn update(&self, event: UpdateHouse) -> AppResult<()>;
    async fn find_all(&self, options: HouseListOptions) -> AppResult<PaginatedList<House>>;
    async fn find_by_id(&self, house_id: HouseId) -> AppResult<Option<House>>;
    // 一泊料金が近い稼働中の物件（自分自身は除く）
    async fn find_similar(&self, house: &House, limit: i64) -> AppResult<Vec<House>>;
}
