use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{HouseId, ReviewId, UserId},
    list::{ListOptions, PaginatedList},
    review::{
        event::{CreateReview, DeleteReview, UpdateReview},
        RatingStats, Review,
    },
};
use kernel::repository::review::ReviewRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::review::{PaginatedReviewRow, RatingStatsRow},
    ConnectionPool,
};

#[derive(new)]
pub struct ReviewRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ReviewRepository for ReviewRepositoryImpl {
    async fn create(&self, event: CreateReview) -> AppResult<ReviewId> {
        let review_id = ReviewId::new();
        sqlx::query(
            r#"
                INSERT INTO reviews (review_id, house_id, user_id, rating, comment)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(review_id)
        .bind(event.house_id)
        .bind(event.author)
        .bind(event.rating)
        .bind(event.comment)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::EntityNotFound("specified house not found".into())
            }
            _ => AppError::SpecificOperationError(e),
        })?;

        Ok(review_id)
    }

    async fn update(&self, event: UpdateReview) -> AppResult<()> {
        self.ensure_author(event.review_id, event.requested_user)
            .await?;

        let res = sqlx::query(
            r#"
                UPDATE reviews
                SET
                    house_id = $2,
                    rating = $3,
                    comment = $4,
                    updated_at = CURRENT_TIMESTAMP(3)
                WHERE review_id = $1 AND user_id = $5
            "#,
        )
        .bind(event.review_id)
        .bind(event.house_id)
        .bind(event.rating)
        .bind(event.comment)
        .bind(event.requested_user)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified review not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, event: DeleteReview) -> AppResult<()> {
        self.ensure_author(event.review_id, event.requested_user)
            .await?;

        let res = sqlx::query("DELETE FROM reviews WHERE review_id = $1 AND user_id = $2")
            .bind(event.review_id)
            .bind(event.requested_user)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified review not found".into()));
        }
        Ok(())
    }

    async fn find_all(&self, options: ListOptions) -> AppResult<PaginatedList<Review>> {
        let ListOptions { limit, offset } = options;
        let rows: Vec<PaginatedReviewRow> = sqlx::query_as(
            r#"
                SELECT
                    COUNT(*) OVER() AS total,
                    r.review_id,
                    r.user_id,
                    u.user_name,
                    h.house_id,
                    h.name AS house_name,
                    r.rating,
                    r.comment,
                    r.created_at
                FROM reviews AS r
                INNER JOIN users AS u ON r.user_id = u.user_id
                INNER JOIN houses AS h ON r.house_id = h.house_id
                ORDER BY r.created_at DESC
                LIMIT $1
                OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let total = rows.first().map(|r| r.total).unwrap_or_default();
        let items = rows.into_iter().map(|r| Review::from(r.review)).collect();

        Ok(PaginatedList {
            total,
            limit,
            offset,
            items,
        })
    }

    async fn rating_stats(&self, house_id: Option<HouseId>) -> AppResult<RatingStats> {
        let row: RatingStatsRow = sqlx::query_as(
            r#"
                SELECT
                    AVG(rating)::FLOAT8 AS average,
                    COUNT(*) AS count
                FROM reviews
                WHERE $1::UUID IS NULL OR house_id = $1
            "#,
        )
        .bind(house_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        // レビューが一件もない場合は 0 件・平均 0 とする
        Ok(RatingStats {
            average: row.average.unwrap_or_default(),
            count: row.count,
        })
    }
}

impl ReviewRepositoryImpl {
    // レビューの更新・削除は投稿者本人のみ
    async fn ensure_author(&self, review_id: ReviewId, requested_user: UserId) -> AppResult<()> {
        let author: Option<(UserId,)> =
            sqlx::query_as("SELECT user_id FROM reviews WHERE review_id = $1")
                .bind(review_id)
                .fetch_optional(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;

        match author {
            None => Err(AppError::EntityNotFound("specified review not found".into())),
            Some((author,)) if author != requested_user => Err(AppError::ForbiddenOperation),
            Some(_) => Ok(()),
        }
    }
}
