//! GridStore web gateway adapter
//!
//! Talks to a web gateway endpoint over HTTP. Objects use plain
//! GET/PUT/DELETE; table and stream operations are function calls against
//! the same URL space, selected by a request header and carried as JSON.

pub mod client;
mod wire;

pub use client::GatewayClient;
