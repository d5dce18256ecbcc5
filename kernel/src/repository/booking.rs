use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    booking::{event::CreateBooking, Booking},
    id::{BookingId, UserId},
};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 予約と付帯サービスを一つのトランザクションで登録する
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>>;
}
