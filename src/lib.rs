pub mod app;
pub mod booking;
pub mod core;
pub mod notifications;
pub mod storage;
