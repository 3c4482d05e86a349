pub mod api;
pub mod auth;
pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod forms;
pub mod list;
pub mod models;
pub mod mutation;
pub mod routes;
pub mod session;

#[cfg(test)]
pub mod testing;
