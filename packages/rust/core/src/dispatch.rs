//! Late-bound operation dispatch.
//!
//! Dispatch links name an operation instead of holding a closure. The chain
//! hands `(target, operation, [input, args...])` to a [`Dispatch`]
//! implementation when the link runs; [`Registry`] is the in-process one.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use rinku_shared::{Result, RinkuError};

use crate::outcome::Outcome;

/// Resolves an operation by name on a target and invokes it.
pub trait Dispatch<V>: Send + Sync {
    /// Invoke `target.operation` with `args` (threaded input first).
    fn invoke(&self, target: &str, operation: &str, args: Vec<V>) -> Result<Outcome<V>>;
}

/// Body of a registered operation.
pub type OperationFn<V> = Arc<dyn Fn(Vec<V>) -> Result<Outcome<V>> + Send + Sync>;

/// Accepted argument count, threaded input included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, got: usize) -> bool {
        match self {
            Self::Exact(n) => got == n,
            Self::AtLeast(n) => got >= n,
        }
    }

    fn minimum(self) -> usize {
        match self {
            Self::Exact(n) | Self::AtLeast(n) => n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "{n}+"),
        }
    }
}

struct Operation<V> {
    arity: Arity,
    func: OperationFn<V>,
}

/// Listing entry returned by [`Registry::operations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    pub target: String,
    pub operation: String,
    pub arity: Arity,
}

impl fmt::Display for OperationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}/{}", self.target, self.operation, self.arity)
    }
}

/// Table of named operations grouped by target.
pub struct Registry<V> {
    targets: BTreeMap<String, BTreeMap<String, Operation<V>>>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self {
            targets: BTreeMap::new(),
        }
    }
}

impl<V> fmt::Debug for Registry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("operations", &self.len())
            .finish()
    }
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target.operation`, replacing any previous entry.
    pub fn register<F>(
        &mut self,
        target: impl Into<String>,
        operation: impl Into<String>,
        arity: Arity,
        func: F,
    ) -> &mut Self
    where
        F: Fn(Vec<V>) -> Result<Outcome<V>> + Send + Sync + 'static,
    {
        self.targets.entry(target.into()).or_default().insert(
            operation.into(),
            Operation {
                arity,
                func: Arc::new(func),
            },
        );
        self
    }

    pub fn contains(&self, target: &str, operation: &str) -> bool {
        self.targets
            .get(target)
            .is_some_and(|ops| ops.contains_key(operation))
    }

    /// Every registered operation, sorted by target then name.
    pub fn operations(&self) -> Vec<OperationInfo> {
        self.targets
            .iter()
            .flat_map(|(target, ops)| {
                ops.iter().map(move |(operation, op)| OperationInfo {
                    target: target.clone(),
                    operation: operation.clone(),
                    arity: op.arity,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Dispatch<V> for Registry<V> {
    fn invoke(&self, target: &str, operation: &str, args: Vec<V>) -> Result<Outcome<V>> {
        let ops = self
            .targets
            .get(target)
            .ok_or_else(|| RinkuError::UnknownTarget {
                target: target.to_string(),
            })?;

        let op = ops
            .get(operation)
            .ok_or_else(|| RinkuError::UnknownOperation {
                target: target.to_string(),
                operation: operation.to_string(),
            })?;

        if !op.arity.accepts(args.len()) {
            return Err(RinkuError::ArityMismatch {
                target: target.to_string(),
                operation: operation.to_string(),
                expected: op.arity.minimum(),
                got: args.len(),
            });
        }

        trace!(dispatch_target = target, operation, argc = args.len(), "dispatching");
        (op.func)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry<i64> {
        let mut registry = Registry::<i64>::new();
        registry
            .register("calc", "combine", Arity::Exact(3), |args| {
                Ok(Outcome::Ok(args.iter().sum()))
            })
            .register("calc", "count", Arity::AtLeast(1), |args| {
                Ok(Outcome::Ok(args.len() as i64))
            });
        registry
    }

    #[test]
    fn invoke_passes_args_in_order() {
        let mut registry = registry();
        registry.register("calc", "ordered", Arity::Exact(3), |args| {
            Ok(Outcome::Ok(args[0] * 100 + args[1] * 10 + args[2]))
        });
        let out = registry.invoke("calc", "ordered", vec![1, 2, 3]).unwrap();
        assert_eq!(out, Outcome::Ok(123));
    }

    #[test]
    fn unknown_target_and_operation() {
        let registry = registry();
        let err = registry.invoke("nope", "combine", vec![1]).unwrap_err();
        assert!(matches!(err, RinkuError::UnknownTarget { target } if target == "nope"));

        let err = registry.invoke("calc", "nope", vec![1]).unwrap_err();
        assert!(matches!(err, RinkuError::UnknownOperation { .. }));
    }

    #[test]
    fn arity_is_checked_at_invoke() {
        let registry = registry();
        let err = registry.invoke("calc", "combine", vec![1, 2]).unwrap_err();
        assert!(matches!(
            err,
            RinkuError::ArityMismatch {
                expected: 3,
                got: 2,
                ..
            }
        ));

        assert_eq!(
            registry.invoke("calc", "count", vec![1, 2, 3, 4]).unwrap(),
            Outcome::Ok(4)
        );
        assert!(registry.invoke("calc", "count", vec![]).is_err());
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = registry();
        registry.register("calc", "combine", Arity::Exact(1), |_| Ok(Outcome::Ok(0)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.invoke("calc", "combine", vec![9]).unwrap(), Outcome::Ok(0));
    }

    #[test]
    fn listing_is_sorted_and_formatted() {
        let registry = registry();
        let listed: Vec<String> = registry.operations().iter().map(ToString::to_string).collect();
        assert_eq!(listed, vec!["calc.combine/3", "calc.count/1+"]);
        assert!(registry.contains("calc", "count"));
        assert!(!registry.contains("calc", "missing"));
        assert!(!registry.is_empty());
    }
}
