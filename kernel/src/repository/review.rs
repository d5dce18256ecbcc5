use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::{HouseId, ReviewId},
    list::{ListOptions, PaginatedList},
    review::{
        event::{CreateReview, DeleteReview, UpdateReview},
        RatingStats, Review,
    },
};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, event: CreateReview) -> AppResult<ReviewId>;
    async fn update(&self, event: UpdateReview) -> AppResult<()>;
    async fn delete(&self, event: DeleteReview) -> AppResult<()>;
    async fn find_all(&self, options: ListOptions) -> AppResult<PaginatedList<Review>>;
    // house_id が None の場合はサイト全体の集計
    async fn rating_stats(&self, house_id: Option<HouseId>) -> AppResult<RatingStats>;
}
