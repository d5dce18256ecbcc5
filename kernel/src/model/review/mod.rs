use crate::model::id::{HouseId, ReviewId, UserId};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct Review {
    pub review_id: ReviewId,
    pub author: ReviewAuthor,
    pub house: ReviewHouse,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReviewAuthor {
    pub user_id: UserId,
    pub user_name: String,
}

#[derive(Debug, Clone)]
pub struct ReviewHouse {
    pub house_id: HouseId,
    pub name: String,
}

// 平均評価はレビューが無ければ 0 とする
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingStats {
    pub average: f64,
    pub count: i64,
}
