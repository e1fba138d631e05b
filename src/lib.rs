//! # TopicHub
//!
//! `topichub` is a minimalist real-time topic broker built with Rust.
//! Clients open a persistent WebSocket connection scoped to a named topic,
//! and every text message sent on that topic is fanned out to all other
//! clients currently subscribed to the same topic.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: The central component that tracks live sessions, routes messages,
//!   and reclaims dead connections.
//! - `connection`: The duplex connection abstraction the broker depends on.
//! - `config`: Handles loading and managing server configuration.
//! - `transport`: Manages the WebSocket server and communication with clients.
//! - `utils`: Contains shared utilities, such as error handling and logging.

pub mod broker;
pub mod config;
pub mod connection;
pub mod transport;
pub mod utils;
