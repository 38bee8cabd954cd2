pub mod coordinator;
pub mod projector;
