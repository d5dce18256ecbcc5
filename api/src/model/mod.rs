pub mod auth;
pub mod booking;
pub mod house;
pub mod list;
pub mod payment;
pub mod review;
pub mod service;
