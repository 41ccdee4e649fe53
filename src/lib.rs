//! pokecache library
//!
//! A caching aggregation layer in front of PokeAPI. The binary is a thin
//! front end over [`pipeline::Pokedex`]; everything is exposed here for use in
//! integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
