pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod types;

pub use error::InventoryError;
