pub mod db;
pub mod import;
pub mod models;
pub mod store;

pub use rusqlite;
