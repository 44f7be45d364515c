//! Trust marking for deferred and streamed content
//!
//! Deferred children and attribute values may be marked as trusted, meaning
//! their text is already safe HTML and must be emitted without escaping.
//! Trust is carried beside the value in a [`PossiblyTrusted`] record rather
//! than inside it, so any future or stream can be marked.
//!
//! Literal strings passed directly as children or attribute values are never
//! trusted; they are always escaped.

/// A value paired with its trust flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PossiblyTrusted<T> {
    pub value: T,
    pub trusted: bool,
}

impl<T> PossiblyTrusted<T> {
    /// Wrap a value that must be escaped on output
    pub fn untrusted(value: T) -> Self {
        Self {
            value,
            trusted: false,
        }
    }

    /// Wrap a value that is emitted verbatim
    pub fn trusted(value: T) -> Self {
        Self {
            value,
            trusted: true,
        }
    }

    /// Mark this value as trusted
    pub fn trust(mut self) -> Self {
        self.trusted = true;
        self
    }

    /// Transform the wrapped value, keeping the trust flag
    pub fn map<U, F>(self, f: F) -> PossiblyTrusted<U>
    where
        F: FnOnce(T) -> U,
    {
        PossiblyTrusted {
            value: f(self.value),
            trusted: self.trusted,
        }
    }

    /// Split into the value and its trust flag
    pub fn into_parts(self) -> (T, bool) {
        (self.value, self.trusted)
    }
}

impl<T> From<T> for PossiblyTrusted<T> {
    fn from(value: T) -> Self {
        Self::untrusted(value)
    }
}
