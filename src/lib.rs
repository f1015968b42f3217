// src/lib.rs
pub mod cli;
pub mod config;
pub mod health;
pub mod metrics;
