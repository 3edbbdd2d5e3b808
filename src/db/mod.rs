pub mod connection;
pub mod providers;

pub use connection::{init_db, Database};
