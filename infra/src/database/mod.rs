//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and migrations
//! - [`MySqlStore`], the production [`PersistentStore`](pv_core::repositories::PersistentStore)

pub mod connection;
pub mod mysql;


pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::MySqlStore;
