pub mod connection;
pub mod fixtures;
pub mod setup;
pub mod snapshot;
pub mod standings;
pub mod teams;

pub use connection::{DbConn, DbPool, create_pool, get_connection};
pub use snapshot::{load_tournament, save_tournament};
