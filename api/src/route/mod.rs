pub mod auth;
pub mod booking;
pub mod health;
pub mod house;
pub mod payment;
pub mod review;
pub mod service;
pub mod v1;
