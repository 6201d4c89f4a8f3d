//! QR attendance kiosk: badge detections and manual entries become at most
//! one check-in per employee per day.

pub mod api;
pub mod attendance;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod kiosk;
pub mod model;
pub mod routes;
pub mod store;
pub mod utils;
