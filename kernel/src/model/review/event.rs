use crate::model::id::{HouseId, ReviewId, UserId};

pub struct CreateReview {
    pub house_id: HouseId,
    pub author: UserId,
    pub rating: i32,
    pub comment: String,
}

pub struct UpdateReview {
    pub review_id: ReviewId,
    pub house_id: HouseId,
    pub rating: i32,
    pub comment: String,
    pub requested_user: UserId,
}

pub struct DeleteReview {
    pub review_id: ReviewId,
    pub requested_user: UserId,
}
