//! Service layer module
//!
//! Contains the generation pipeline stages, the HTTP transport and the client that drives them

pub mod call_shape;
pub mod client;
pub mod cost;
pub mod normalizer;
pub mod request_builder;
pub mod retry;
pub mod transport;

pub use call_shape::{AmbiguityWarning, CallArg, CallArgs, CallShape, ResolvedCall};
pub use client::{ForkOptions, Magic};
pub use cost::{CostContainer, CostOwner, CostTracker};
pub use normalizer::{Normalized, Payload};
pub use retry::{Postprocess, PostprocessOutcome};
pub use transport::{HttpTransport, Transport};
