//! The stateful heart of the system: provisional-quote registry,
//! reservation, deposit issuance/confirmation, and execution lifecycle plus
//! driver. Each sub-responsibility is a free-function module sharing the
//! same key-value backing store used by the edge cache.

pub mod deposit;
pub mod execution;
pub mod provisional;
pub mod reserve;
