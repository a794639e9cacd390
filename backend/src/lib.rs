pub mod config;
pub mod db;
pub mod http;
pub mod metrics;
pub mod sink;
pub mod state;
pub mod tasks;

pub mod error;
pub mod logger;
pub mod time;
