pub mod engine;
pub mod message;
pub mod registry;

pub use engine::Relay;
