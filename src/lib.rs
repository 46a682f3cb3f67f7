//! Authoritative server for a blob-eats-blob arena game.
//!
//! A fixed-rate tick loop owns the world: blobs drift or steer, bigger
//! eats smaller, hostiles bounce, oversized drifters split, and every
//! connected client receives its own visibility-filtered snapshot each
//! tick over a WebSocket. Clients only ever submit inputs; all outcomes
//! are decided here.

pub mod config;
pub mod game;
pub mod net;
pub mod util;
