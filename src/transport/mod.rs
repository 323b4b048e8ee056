mod connection;

pub use connection::SerialConnection;
