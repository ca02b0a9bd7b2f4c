//! # Utility Functions Module
//!
//! Helpers for building external command lines without repeated `.to_string()` calls.

/// Builds an argument vector from heterogeneous displayable items.
///
/// ```rust
/// use png_webp_converter::args;
///
/// let level = 4;
/// let args = args!["-compression_level", level];
/// assert_eq!(args, vec!["-compression_level", "4"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$($item.to_string()),*]
    };
}
