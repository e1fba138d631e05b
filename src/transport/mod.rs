//! The `transport` module is responsible for handling network communication
//! with clients via WebSockets.
//!
//! It implements the HTTP-upgrade subscribe endpoint, wraps each accepted
//! socket in the broker's `Connection` abstraction, and hands the session
//! over to the broker's receive loop.

pub mod websocket;

#[cfg(test)]
mod tests;
