//! Data models module
//!
//! Defines the wire structures exchanged with the generation service

pub mod generate;
pub mod returns;
pub mod template;

pub use generate::{GenerateRequest, Meta, WireRequest};
pub use returns::{OptionalReturns, ReturnDescription, Returns, Specs};
pub use template::{RunRequest, UpvoteRequest};
