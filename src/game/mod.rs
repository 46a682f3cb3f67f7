//! Simulation core: entities, world state, inputs, and side effects.

pub mod blob;
pub mod constants;
pub mod effects;
pub mod input;
pub mod names;
pub mod world;
