pub mod app;
pub mod config;
pub mod dispatch;
pub mod lifecycle;
pub mod message;
pub mod model;
pub mod session;
