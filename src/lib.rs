//! Chat Courier - Reply-Correlation Relay
//!
//! This crate relays HTTP requests into a group-chat transport, tags each
//! outbound message with a correlation id, and polls for the asynchronously
//! arriving reply that carries the same id back.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
