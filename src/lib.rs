pub mod ai;
pub mod config;
pub mod db;
pub mod errors;
pub mod market;
pub mod metrics;
pub mod models;
pub mod services;
