//! Status bus implementations.

pub mod inprocess;

pub use inprocess::InProcessStatusBus;
