use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{HouseId, ReviewId, UserId},
    review::{
        event::{CreateReview, UpdateReview},
        RatingStats, Review, ReviewAuthor, ReviewHouse,
    },
};
use serde::{Deserialize, Serialize};

use super::list::PaginatedResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[garde(skip)]
    pub house_id: HouseId,
    #[garde(range(min = 1, max = 5))]
    pub rating: i32,
    #[garde(length(max = 2000))]
    #[serde(default)]
    pub comment: String,
}

#[derive(new)]
pub struct CreateReviewRequestWithAuthor(UserId, CreateReviewRequest);

impl From<CreateReviewRequestWithAuthor> for CreateReview {
    fn from(value: CreateReviewRequestWithAuthor) -> Self {
        let CreateReviewRequestWithAuthor(
            author,
            CreateReviewRequest {
                house_id,
                rating,
                comment,
            },
        ) = value;
        Self {
            house_id,
            author,
            rating,
            comment,
        }
    }
}

// 更新時も作成時と同じ項目をすべて受け取る
pub type UpdateReviewRequest = CreateReviewRequest;

#[derive(new)]
pub struct UpdateReviewRequestWithIds(ReviewId, UserId, UpdateReviewRequest);

impl From<UpdateReviewRequestWithIds> for UpdateReview {
    fn from(value: UpdateReviewRequestWithIds) -> Self {
        let UpdateReviewRequestWithIds(
            review_id,
            requested_user,
            CreateReviewRequest {
                house_id,
                rating,
                comment,
            },
        ) = value;
        Self {
            review_id,
            house_id,
            rating,
            comment,
            requested_user,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub review_id: ReviewId,
    pub author: ReviewAuthorResponse,
    pub house: ReviewHouseResponse,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(value: Review) -> Self {
        let Review {
            review_id,
            author,
            house,
            rating,
            comment,
            created_at,
        } = value;
        Self {
            review_id,
            author: author.into(),
            house: house.into(),
            rating,
            comment,
            created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthorResponse {
    pub user_id: UserId,
    pub user_name: String,
}

impl From<ReviewAuthor> for ReviewAuthorResponse {
    fn from(value: ReviewAuthor) -> Self {
        let ReviewAuthor { user_id, user_name } = value;
        Self { user_id, user_name }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewHouseResponse {
    pub house_id: HouseId,
    pub name: String,
}

impl From<ReviewHouse> for ReviewHouseResponse {
    fn from(value: ReviewHouse) -> Self {
        let ReviewHouse { house_id, name } = value;
        Self { house_id, name }
    }
}

pub type PaginatedReviewResponse = PaginatedResponse<ReviewResponse>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStatsResponse {
    // 小数点以下1桁に丸めて返す
    pub average: f64,
    pub count: i64,
}

impl From<RatingStats> for RatingStatsResponse {
    fn from(value: RatingStats) -> Self {
        let RatingStats { average, count } = value;
        Self {
            average: (average * 10.0).round() / 10.0,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_between_one_and_five() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let req = CreateReviewRequest {
                house_id: HouseId::new(),
                rating,
                comment: "ok".into(),
            };
            assert_eq!(req.validate().is_ok(), ok, "rating {rating}");
        }
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let res = RatingStatsResponse::from(RatingStats {
            average: 4.666,
            count: 3,
        });
        assert_eq!(res.average, 4.7);
        assert_eq!(res.count, 3);
    }
}
