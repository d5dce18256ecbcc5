use kernel::model::{house::House, id::HouseId};
use rust_decimal::Decimal;

#[derive(sqlx::FromRow)]
pub struct HouseRow {
    pub house_id: HouseId,
    pub name: String,
    pub description: String,
    pub capacity: i32,
    pub price_per_night: Decimal,
    pub is_active: bool,
    pub amenities: String,
}

impl From<HouseRow> for House {
    fn from(value: HouseRow) -> Self {
        let HouseRow {
            house_id,
            name,
            description,
            capacity,
            price_per_night,
            is_active,
            amenities,
        } = value;
        House {
            house_id,
            name,
            description,
            capacity,
            price_per_night,
            is_active,
            amenities,
        }
    }
}

// ページネーション用に総件数を一緒に取得する
#[derive(sqlx::FromRow)]
pub struct PaginatedHouseRow {
    pub total: i64,
    #[sqlx(flatten)]
    pub house: HouseRow,
}
