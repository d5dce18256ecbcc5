use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    house::{
        event::{CreateHouse, UpdateHouse},
        House, HouseListOptions,
    },
    id::HouseId,
    list::PaginatedList,
};
use kernel::repository::house::HouseRepository;
use shared::error::{AppError, AppResult};
use sqlx::{Postgres, QueryBuilder};

use crate::database::{
    model::house::{HouseRow, PaginatedHouseRow},
    ConnectionPool,
};

#[derive(new)]
pub struct HouseRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl HouseRepository for HouseRepositoryImpl {
    async fn create(&self, event: CreateHouse) -> AppResult<HouseId> {
        let house_id = HouseId::new();
        sqlx::query(
            r#"
                INSERT INTO houses
                (house_id, name, description, capacity, price_per_night, is_active, amenities)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(house_id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.capacity)
        .bind(event.price_per_night)
        .bind(event.is_active)
        .bind(event.amenities)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(house_id)
    }

    async fn update(&self, event: UpdateHouse) -> AppResult<()> {
        // 指定されなかった項目は現在の値のまま残す
        let res = sqlx::query(
            r#"
                UPDATE houses
                SET
                    name = COALESCE($2, name),
                    description = COALESCE($3, description),
                    capacity = COALESCE($4, capacity),
                    price_per_night = COALESCE($5, price_per_night),
                    is_active = COALESCE($6, is_active),
                    amenities = COALESCE($7, amenities),
                    updated_at = CURRENT_TIMESTAMP(3)
                WHERE house_id = $1
            "#,
        )
        .bind(event.house_id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.capacity)
        .bind(event.price_per_night)
        .bind(event.is_active)
        .bind(event.amenities)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified house not found".into()));
        }

        tracing::info!(
            house_id = %event.house_id,
            requested_user = %event.requested_user,
            "House updated"
        );
        Ok(())
    }

    async fn find_all(&self, options: HouseListOptions) -> AppResult<PaginatedList<House>> {
        let HouseListOptions {
            guests,
            name,
            min_price,
            max_price,
            only_active,
            limit,
            offset,
        } = options;

        let mut query = QueryBuilder::<Postgres>::new(
            r#"
                SELECT
                    COUNT(*) OVER() AS total,
                    house_id,
                    name,
                    description,
                    capacity,
                    price_per_night,
                    is_active,
                    amenities
                FROM houses
                WHERE TRUE
            "#,
        );
        if only_active {
            query.push(" AND is_active");
        }
        if let Some(guests) = guests {
            query.push(" AND capacity >= ").push_bind(guests);
        }
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            query
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(&name)));
        }
        if let Some(min_price) = min_price {
            query.push(" AND price_per_night >= ").push_bind(min_price);
        }
        if let Some(max_price) = max_price {
            query.push(" AND price_per_night <= ").push_bind(max_price);
        }
        query
            .push(" ORDER BY name ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<PaginatedHouseRow> = query
            .build_query_as::<PaginatedHouseRow>()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        let total = rows.first().map(|r| r.total).unwrap_or_default();
        let items = rows.into_iter().map(|r| House::from(r.house)).collect();

        Ok(PaginatedList {
            total,
            limit,
            offset,
            items,
        })
    }

    async fn find_by_id(&self, house_id: HouseId) -> AppResult<Option<House>> {
        let row: Option<HouseRow> = sqlx::query_as(
            r#"
                SELECT
                    house_id,
                    name,
                    description,
                    capacity,
                    price_per_night,
                    is_active,
                    amenities
                FROM houses
                WHERE house_id = $1
            "#,
        )
        .bind(house_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(House::from))
    }

    async fn find_similar(&self, house: &House, limit: i64) -> AppResult<Vec<House>> {
        let (low, high) = house.similar_price_range();
        let rows: Vec<HouseRow> = sqlx::query_as(
            r#"
                SELECT
                    house_id,
                    name,
                    description,
                    capacity,
                    price_per_night,
                    is_active,
                    amenities
                FROM houses
                WHERE is_active
                  AND house_id <> $1
                  AND price_per_night BETWEEN $2 AND $3
                ORDER BY name ASC
                LIMIT $4
            "#,
        )
        .bind(house.house_id)
        .bind(low)
        .bind(high)
        .bind(limit)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(House::from).collect())
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::id::UserId;
    use rust_decimal::Decimal;

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[sqlx::test]
    async fn test_register_and_filter_houses(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = HouseRepositoryImpl::new(ConnectionPool::new(pool));

        for (name, capacity, price) in [("Birch", 2, 3000), ("Cedar", 6, 5000), ("Oak", 8, 9000)] {
            repo.create(CreateHouse {
                name: name.into(),
                description: "Test Description".into(),
                capacity,
                price_per_night: Decimal::from(price),
                is_active: true,
                amenities: "Sauna\nWi-Fi".into(),
            })
            .await?;
        }

        let res = repo
            .find_all(HouseListOptions {
                guests: Some(4),
                max_price: Some(Decimal::from(6000)),
                only_active: true,
                limit: 10,
                offset: 0,
                ..Default::default()
            })
            .await?;
        assert_eq!(res.total, 1);
        assert_eq!(res.items[0].name, "Cedar");

        let cedar = res.items[0].clone();
        repo.update(UpdateHouse {
            house_id: cedar.house_id,
            name: None,
            description: None,
            capacity: None,
            price_per_night: Some(Decimal::from(3500)),
            is_active: None,
            amenities: None,
            requested_user: UserId::new(),
        })
        .await?;

        let updated = repo.find_by_id(cedar.house_id).await?.unwrap();
        assert_eq!(updated.price_per_night, Decimal::from(3500));
        assert_eq!(updated.capacity, 6);

        // 3500 の ±20% に入るのは Birch (3000) のみ
        let similar = repo.find_similar(&updated, 4).await?;
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].name, "Birch");
        Ok(())
    }
}
