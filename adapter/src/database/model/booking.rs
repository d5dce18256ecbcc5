use chrono::{DateTime, NaiveDate, Utc};
use kernel::model::{
    booking::{Booking, BookingHouse, BookingService},
    id::{BookingId, HouseId, ServiceId, UserId},
};
use rust_decimal::Decimal;

// 予約一覧・詳細の取得に使う型。物件情報を JOIN して取得する
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub house_id: HouseId,
    pub house_name: String,
    pub price_per_night: Decimal,
}

impl BookingRow {
    pub fn into_booking(self, services: Vec<BookingService>) -> Booking {
        let BookingRow {
            booking_id,
            user_id,
            check_in,
            check_out,
            guests,
            total_cost,
            created_at,
            house_id,
            house_name,
            price_per_night,
        } = self;
        Booking {
            booking_id,
            booked_by: user_id,
            check_in,
            check_out,
            guests,
            total_cost,
            created_at,
            house: BookingHouse {
                house_id,
                name: house_name,
                price_per_night,
            },
            services,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct BookingServiceRow {
    pub booking_id: BookingId,
    pub service_id: ServiceId,
    pub name: String,
    pub price: Decimal,
}

impl From<BookingServiceRow> for BookingService {
    fn from(value: BookingServiceRow) -> Self {
        let BookingServiceRow {
            booking_id: _,
            service_id,
            name,
            price,
        } = value;
        BookingService {
            service_id,
            name,
            price,
        }
    }
}
