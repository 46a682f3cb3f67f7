//! Network layer: wire protocol, session registry, tick fan-out, transport.

pub mod broadcaster;
pub mod protocol;
pub mod session;
pub mod transport;
