//! Plain data types that flow into and out of the composer.

pub mod request;
pub mod story;
pub mod theme;
