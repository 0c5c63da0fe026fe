// Signal computations
pub mod analytics;

// Market data value objects
pub mod market;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
