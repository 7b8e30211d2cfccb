pub mod connection;
pub mod table;
pub mod value;

pub use connection::MySqlEndpoint;
