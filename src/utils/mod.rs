//! Utility functions
//!
//! Provides network utilities.

pub mod network;
