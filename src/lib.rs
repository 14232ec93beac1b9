//! Country capital, flag and population aggregation over public REST APIs

pub mod config;
pub mod services;
pub mod sources;
pub mod types;
