pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod workflow;

#[cfg(test)]
pub mod testing;
