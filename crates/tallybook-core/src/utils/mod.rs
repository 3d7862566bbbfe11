//! Utility functions for number and string formatting.

pub mod format;

pub use format::{display_width, format_amount, pad_to_width, truncate_string};
