pub mod client;
pub mod config;
pub mod connection;
pub mod probe;
pub mod storage;

pub use client::ClientError;
