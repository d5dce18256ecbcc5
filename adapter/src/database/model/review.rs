use chrono::{DateTime, Utc};
use kernel::model::{
    id::{HouseId, ReviewId, UserId},
    review::{Review, ReviewAuthor, ReviewHouse},
};

#[derive(sqlx::FromRow)]
pub struct ReviewRow {
    pub review_id: ReviewId,
    pub user_id: UserId,
    pub user_name: String,
    pub house_id: HouseId,
    pub house_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(value: ReviewRow) -> Self {
        let ReviewRow {
            review_id,
            user_id,
            user_name,
            house_id,
            house_name,
            rating,
            comment,
            created_at,
        } = value;
        Review {
            review_id,
            author: ReviewAuthor { user_id, user_name },
            house: ReviewHouse {
                house_id,
                name: house_name,
            },
            rating,
            comment,
            created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct PaginatedReviewRow {
    pub total: i64,
    #[sqlx(flatten)]
    pub review: ReviewRow,
}

#[derive(sqlx::FromRow)]
pub struct RatingStatsRow {
    pub average: Option<f64>,
    pub count: i64,
}
