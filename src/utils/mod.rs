//! # Utility Modules
//!
//! Supporting utilities for logging and timing.
//!
//! ## Components
//! - **Logging**: Structured logging configuration
//! - **Timeout**: Default deadlines for transport operations

pub mod logging;
pub mod timeout;
