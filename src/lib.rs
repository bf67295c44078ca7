pub mod auth;
pub mod backend;
pub mod cart;
pub mod cli;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod middleware;
pub mod resources;
pub mod store;
pub mod users;

#[cfg(test)]
pub mod testing;
