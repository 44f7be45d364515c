//! Error handling for html-stream
//!
//! This module provides the error type shared by every stage of the pipeline.
//! Streams produced by this crate yield `Result<T, Error>` items and end after
//! the first `Err`, so a failed document always carries exactly one terminal
//! error.
//!
//! # Error Types
//!
//! - [`Error::UsageError`] - malformed `create_element` calls, reported synchronously
//! - [`Error::AttributeNameError`] - attribute names with illegal characters
//! - [`Error::AttributeValueTypeError`] - attribute values that are neither strings nor booleans
//! - [`Error::UpstreamError`] - failures from caller-supplied futures and streams
//! - [`Error::InvariantViolation`] - malformed token streams reaching the serializer
//! - [`Error::IoError`] - failures while writing output to a sink
//!
//! # Usage
//!
//! ```rust,ignore
//! use html_stream::{create_element, Error};
//!
//! match create_element("br", None, vec!["text".into()]) {
//!     Err(Error::UsageError(msg)) => println!("Bad call: {}", msg),
//!     Err(err) => println!("Other error: {}", err),
//!     Ok(stream) => { /* consume */ }
//! }
//! ```
//!
//! Partial output received before an error must be discarded by the caller.

use std::borrow::Cow;
use thiserror::Error;

/// Error type for all html-stream operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed call shape
    ///
    /// Returned synchronously by `create_element`, for example when a void
    /// element is given children or a fragment is given attributes.
    #[error("Usage error: {0}")]
    UsageError(Cow<'static, str>),

    /// Attribute name contains a control, a noncharacter, or one of
    /// space, `"`, `'`, `>`, `/`, `=`
    #[error("Attribute name `{0}` contains one or more invalid characters")]
    AttributeNameError(String),

    /// Attribute value resolved to something other than a string or boolean
    #[error("Attribute value for `{name}` has invalid type ({observed})")]
    AttributeValueTypeError {
        name: String,
        observed: Cow<'static, str>,
    },

    /// Failure reported by a caller-supplied future or stream
    #[error("Upstream error: {0}")]
    UpstreamError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Token stream broke the serializer's nesting invariant
    ///
    /// This indicates a defect in the token producer, not a recoverable
    /// condition.
    #[error("Invariant violation: {0}")]
    InvariantViolation(Cow<'static, str>),

    /// Writing serialized output failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Create a usage error with a static string
    pub fn usage_static(msg: &'static str) -> Self {
        Error::UsageError(Cow::Borrowed(msg))
    }

    /// Create a usage error with an owned string
    pub fn usage_owned(msg: String) -> Self {
        Error::UsageError(Cow::Owned(msg))
    }

    /// Create an invariant violation with a static string
    pub fn invariant_static(msg: &'static str) -> Self {
        Error::InvariantViolation(Cow::Borrowed(msg))
    }

    /// Create an attribute value type error
    pub fn attribute_value_type(name: &str, observed: &'static str) -> Self {
        Error::AttributeValueTypeError {
            name: name.to_string(),
            observed: Cow::Borrowed(observed),
        }
    }

    /// Wrap a foreign error from a deferred value or upstream stream
    ///
    /// ```rust,ignore
    /// use html_stream::{Child, Error};
    ///
    /// let child = Child::deferred(async {
    ///     let body = fetch_body().await.map_err(Error::upstream)?;
    ///     Ok(Child::from(body))
    /// });
    /// ```
    pub fn upstream<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::UpstreamError(Box::new(err))
    }
}

/// Result type alias for html-stream operations
pub type Result<T> = std::result::Result<T, Error>;
