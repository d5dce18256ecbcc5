pub mod booking;
pub mod house;
pub mod payment;
pub mod review;
pub mod service;
pub mod user;
