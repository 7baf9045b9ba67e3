pub mod application;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod ports;
pub mod roster;
pub mod upsert;
pub mod utils;

#[cfg(test)]
mod testing;
