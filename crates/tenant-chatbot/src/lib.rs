pub mod config;
pub mod document;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
