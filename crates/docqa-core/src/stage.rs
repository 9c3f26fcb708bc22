//! Stage outcomes for the degradation ladder.
//!
//! Every optional stage of the pipeline (model startup, lexical index, vector
//! index, ensemble construction) yields an [`Availability`] instead of an error,
//! so the orchestrator branches on data rather than on caught failures.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> Availability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Convert a fallible build step into an availability, logging the reason
    /// when it failed.
    pub fn from_result<E: fmt::Display>(stage: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => {
                tracing::warn!(stage, error = %e, "stage unavailable");
                Self::Unavailable(e.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn as_ref(&self) -> Availability<&T> {
        match self {
            Self::Ready(v) => Availability::Ready(v),
            Self::Unavailable(r) => Availability::Unavailable(r.clone()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Unavailable(_) => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable(r) => Some(r),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Availability<U> {
        match self {
            Self::Ready(v) => Availability::Ready(f(v)),
            Self::Unavailable(r) => Availability::Unavailable(r),
        }
    }
}
