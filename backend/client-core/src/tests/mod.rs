mod config;
mod error;
mod probe;
