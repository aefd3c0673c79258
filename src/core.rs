pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod landscape;
