//! Utility modules: deadline and cancellation guard.

pub mod timeout;
