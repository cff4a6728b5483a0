//! Postprocess retry loop
//!
//! A generation can be well-formed yet unusable. When a postprocess function
//! is configured it validates every result; if nothing usable comes back the
//! whole remote generation is issued again, up to `retries` more times.
//! Attempts are strictly sequential.

use super::normalizer::{Payload, META_KEY};
use crate::utils::error::{MagicError, MagicResult};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of postprocessing one result
#[derive(Debug, Clone, PartialEq)]
pub enum PostprocessOutcome {
    /// Usable, possibly transformed
    Accepted(Value),
    /// Unusable, with the reason
    Rejected(String),
}

impl PostprocessOutcome {
    pub fn reject(reason: impl Into<String>) -> Self {
        PostprocessOutcome::Rejected(reason.into())
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, PostprocessOutcome::Accepted(_))
    }
}

impl<E: fmt::Display> From<Result<Value, E>> for PostprocessOutcome {
    fn from(result: Result<Value, E>) -> Self {
        match result {
            Ok(value) => PostprocessOutcome::Accepted(value),
            Err(e) => PostprocessOutcome::Rejected(e.to_string()),
        }
    }
}

type PostprocessFn = dyn Fn(Value) -> PostprocessOutcome + Send + Sync;

/// Caller-supplied validation/transformation of each result
#[derive(Clone)]
pub struct Postprocess(Arc<PostprocessFn>);

impl Postprocess {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> PostprocessOutcome + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a function reporting rejection through `Err`
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self::new(move |value| f(value).into())
    }

    /// Postprocess one element
    ///
    /// A `_meta` tag on the element is hidden from the function and put back
    /// unchanged when the accepted value is an object.
    pub fn apply(&self, element: Value) -> PostprocessOutcome {
        let (element, meta) = match element {
            Value::Object(mut object) => {
                let meta = object.remove(META_KEY);
                (Value::Object(object), meta)
            }
            other => (other, None),
        };

        match ((self.0)(element), meta) {
            (PostprocessOutcome::Accepted(Value::Object(mut object)), Some(meta)) => {
                object.insert(META_KEY.to_string(), meta);
                PostprocessOutcome::Accepted(Value::Object(object))
            }
            (outcome, _) => outcome,
        }
    }
}

impl fmt::Debug for Postprocess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Postprocess(..)")
    }
}

/// What a processed attempt leads to
enum Step {
    Success(Value),
    Rejected { last_value: Value },
}

/// Run attempts until postprocess accepts a result
///
/// `attempt` is called with the 1-based attempt number and performs one full
/// request/normalize cycle. Without a postprocess the first result is
/// returned as is. Errors from `attempt` propagate immediately.
pub async fn run<F, Fut>(mut attempt: F, postprocess: Option<&Postprocess>, retries: u32) -> MagicResult<Value>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = MagicResult<Payload>>,
{
    let mut accumulated: Vec<Value> = Vec::new();
    let mut attempts_left = retries;
    let mut attempt_number = 0;

    loop {
        attempt_number += 1;
        let payload = attempt(attempt_number).await?;

        let Some(postprocess) = postprocess else {
            return Ok(payload.into_value());
        };

        let last_value = match process(payload, postprocess, &mut accumulated, attempts_left > 0) {
            Step::Success(value) => {
                debug!("Postprocess accepted the result of attempt {}", attempt_number);
                return Ok(value);
            }
            Step::Rejected { last_value } => last_value,
        };

        if attempts_left == 0 {
            return Err(MagicError::PostprocessExhausted {
                attempts: attempt_number,
                last_value,
            });
        }

        attempts_left -= 1;
        warn!("Postprocess rejected the result, retrying ({} retries left)", attempts_left);
    }
}

fn process(payload: Payload, postprocess: &Postprocess, accumulated: &mut Vec<Value>, will_retry: bool) -> Step {
    match payload {
        Payload::Many(elements) => {
            let last_value = Value::Array(elements.clone());
            for element in elements {
                match postprocess.apply(element) {
                    PostprocessOutcome::Accepted(value) => accumulated.push(value),
                    PostprocessOutcome::Rejected(reason) => log_rejection(&reason, will_retry),
                }
            }

            if accumulated.is_empty() {
                Step::Rejected { last_value }
            } else {
                Step::Success(Value::Array(std::mem::take(accumulated)))
            }
        }
        Payload::Single(element) => {
            let last_value = element.clone();
            match postprocess.apply(element) {
                PostprocessOutcome::Accepted(value) => Step::Success(value),
                PostprocessOutcome::Rejected(reason) => {
                    log_rejection(&reason, will_retry);
                    Step::Rejected { last_value }
                }
            }
        }
    }
}

fn log_rejection(reason: &str, will_retry: bool) {
    if will_retry {
        warn!("Postprocess rejected a result: {}", reason);
    } else {
        debug!("Postprocess rejected a result: {}", reason);
    }
}
