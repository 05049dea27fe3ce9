pub mod config;
pub mod kernel;
pub mod storage;
pub mod transport;

// Re-export the pieces a driver needs to wire things up
pub use kernel::interpreter::Interpreter;
pub use kernel::reactor::Reactor;
