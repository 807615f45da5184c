//! Link outcomes: a success value or a failure signal.
//!
//! A failure signal is the only thing that halts a chain. It carries an
//! ordered payload of opaque fields; an empty payload is the bare failure
//! marker, a non-empty one is the tagged form (`error, reason, ...`) of any
//! length. The executor never looks inside the payload.

use serde::{Deserialize, Serialize};

/// What a link produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<V> {
    /// Success; threaded into the next link.
    Ok(V),
    /// Failure signal; stops the chain.
    Error(Failure<V>),
}

impl<V> Outcome<V> {
    /// Shorthand for a bare failure signal.
    pub fn error() -> Self {
        Self::Error(Failure::bare())
    }

    /// Returns `true` for a success value.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns `true` for a failure signal.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The success value, if any.
    pub fn ok(&self) -> Option<&V> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The failure signal, if any.
    pub fn failure(&self) -> Option<&Failure<V>> {
        match self {
            Self::Ok(_) => None,
            Self::Error(failure) => Some(failure),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<V, Failure<V>> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Error(failure) => Err(failure),
        }
    }
}

impl<V> From<Failure<V>> for Outcome<V> {
    fn from(failure: Failure<V>) -> Self {
        Self::Error(failure)
    }
}

impl<V> From<Result<V, Failure<V>>> for Outcome<V> {
    fn from(result: Result<V, Failure<V>>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(failure) => Self::Error(failure),
        }
    }
}

/// A failure signal with its opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Failure<V> {
    payload: Vec<V>,
}

impl<V> Failure<V> {
    /// The bare marker, with no payload.
    pub fn bare() -> Self {
        Self {
            payload: Vec::new(),
        }
    }

    /// A tagged failure carrying the given payload fields in order.
    pub fn new(payload: Vec<V>) -> Self {
        Self { payload }
    }

    /// A tagged failure with a single payload field.
    pub fn tagged(reason: V) -> Self {
        Self {
            payload: vec![reason],
        }
    }

    /// Append one more payload field.
    pub fn with(mut self, field: V) -> Self {
        self.payload.push(field);
        self
    }

    /// `true` when this is the bare marker.
    pub fn is_bare(&self) -> bool {
        self.payload.is_empty()
    }

    /// Size of the equivalent tagged tuple, marker included.
    pub fn arity(&self) -> usize {
        1 + self.payload.len()
    }

    /// First payload field, conventionally the reason.
    pub fn reason(&self) -> Option<&V> {
        self.payload.first()
    }

    pub fn payload(&self) -> &[V] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<V> {
        self.payload
    }
}

impl<V> Default for Failure<V> {
    fn default() -> Self {
        Self::bare()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn bare_and_tagged_arity() {
        let bare: Failure<i32> = Failure::bare();
        assert!(bare.is_bare());
        assert_eq!(bare.arity(), 1);
        assert_eq!(bare.reason(), None);

        let tagged = Failure::tagged("oh_no").with("more").with("most");
        assert!(!tagged.is_bare());
        assert_eq!(tagged.arity(), 4);
        assert_eq!(tagged.reason(), Some(&"oh_no"));
        assert_eq!(tagged.payload(), &["oh_no", "more", "most"]);
        assert_eq!(tagged.into_payload(), vec!["oh_no", "more", "most"]);
    }

    #[test]
    fn conversions_into_outcome() {
        let from_failure: Outcome<i32> = Failure::tagged(7).into();
        assert!(from_failure.is_error());

        let from_ok: Outcome<i32> = Ok::<_, Failure<i32>>(3).into();
        assert_eq!(from_ok.ok(), Some(&3));

        let from_err: Outcome<i32> = Err(Failure::bare()).into();
        assert_eq!(from_err, Outcome::error());
    }

    #[test]
    fn into_result_splits_sides() {
        assert_eq!(Outcome::Ok(1).into_result(), Ok(1));
        assert_eq!(
            Outcome::<i32>::Error(Failure::tagged(2)).into_result(),
            Err(Failure::tagged(2))
        );
    }

    #[test]
    fn json_shape() {
        let ok: Outcome<Value> = Outcome::Ok(json!(5));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({ "ok": 5 }));

        let err: Outcome<Value> = Failure::tagged(json!("empty")).into();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "error": ["empty"] })
        );

        let parsed: Outcome<Value> =
            serde_json::from_value(json!({ "error": [] })).expect("deserialize");
        assert_eq!(parsed, Outcome::error());
    }
}
