pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod link;
pub mod relay;
pub mod server;
