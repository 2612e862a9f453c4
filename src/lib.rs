pub mod api;
pub mod builder;
pub mod clients;
pub mod config;
pub mod dispatcher;
pub mod format;
pub mod logger;
pub mod models;
pub mod subscriber;
pub mod utils;
