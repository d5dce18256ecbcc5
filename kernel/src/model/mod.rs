pub mod auth;
pub mod booking;
pub mod house;
pub mod id;
pub mod list;
pub mod payment;
pub mod review;
pub mod role;
pub mod service;
pub mod user;
