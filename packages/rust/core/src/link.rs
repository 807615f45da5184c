//! Deferred chain steps.

use std::fmt;
use std::sync::Arc;

use rinku_shared::Result;

use crate::dispatch::Dispatch;
use crate::outcome::Outcome;

/// Callable taking only the threaded input.
pub type UnaryFn<V> = Arc<dyn Fn(V) -> Outcome<V> + Send + Sync>;

/// Callable taking the threaded input followed by bound extra arguments.
pub type BoundFn<V> = Arc<dyn Fn(V, &[V]) -> Outcome<V> + Send + Sync>;

/// The work a link performs once the chain runs.
pub enum Callback<V> {
    /// `f(input)`
    Unary(UnaryFn<V>),
    /// `f(input, args...)`
    Bound(BoundFn<V>),
    /// `dispatcher.invoke(target, operation, [input, args...])`, resolved
    /// only when the link executes.
    Dispatch {
        dispatcher: Arc<dyn Dispatch<V>>,
        target: String,
        operation: String,
    },
}

impl<V> Clone for Callback<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Unary(f) => Self::Unary(Arc::clone(f)),
            Self::Bound(f) => Self::Bound(Arc::clone(f)),
            Self::Dispatch {
                dispatcher,
                target,
                operation,
            } => Self::Dispatch {
                dispatcher: Arc::clone(dispatcher),
                target: target.clone(),
                operation: operation.clone(),
            },
        }
    }
}

impl<V> fmt::Debug for Callback<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unary(_) => f.write_str("Unary(..)"),
            Self::Bound(_) => f.write_str("Bound(..)"),
            Self::Dispatch {
                target, operation, ..
            } => write!(f, "Dispatch({target}.{operation})"),
        }
    }
}

/// One unexecuted step of a chain.
#[derive(Debug, Clone)]
pub struct Link<V> {
    pub(crate) callback: Callback<V>,
    pub(crate) args: Vec<V>,
    pub(crate) name: Option<String>,
}

impl<V: 'static> Link<V> {
    /// A link that calls `f` with the threaded input.
    pub fn unary<F, R>(f: F) -> Self
    where
        F: Fn(V) -> R + Send + Sync + 'static,
        R: Into<Outcome<V>>,
    {
        Self {
            callback: Callback::Unary(Arc::new(move |input: V| -> Outcome<V> { f(input).into() })),
            args: Vec::new(),
            name: None,
        }
    }

    /// A link that calls `f` with the threaded input and `args`.
    pub fn with_args<F, R>(f: F, args: Vec<V>) -> Self
    where
        F: Fn(V, &[V]) -> R + Send + Sync + 'static,
        R: Into<Outcome<V>>,
    {
        Self {
            callback: Callback::Bound(Arc::new(move |input: V, args: &[V]| -> Outcome<V> {
                f(input, args).into()
            })),
            args,
            name: None,
        }
    }

    /// A link that invokes `target.operation` through `dispatcher`.
    ///
    /// Nothing is looked up here; an unknown target or operation only
    /// surfaces when the chain runs.
    pub fn dispatch(
        dispatcher: Arc<dyn Dispatch<V>>,
        target: impl Into<String>,
        operation: impl Into<String>,
        args: Vec<V>,
    ) -> Self {
        Self {
            callback: Callback::Dispatch {
                dispatcher,
                target: target.into(),
                operation: operation.into(),
            },
            args,
            name: None,
        }
    }
}

impl<V> Link<V> {
    /// Name this step so its result can be looked up after a run.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn args(&self) -> &[V] {
        &self.args
    }

    pub fn callback(&self) -> &Callback<V> {
        &self.callback
    }
}

impl<V: Clone> Link<V> {
    /// Execute the step against `input`.
    ///
    /// Only dispatch can fail here; plain callables return their outcome
    /// directly and a panic inside one unwinds through the caller.
    pub(crate) fn invoke(&self, input: V) -> Result<Outcome<V>> {
        match &self.callback {
            Callback::Unary(f) => Ok(f(input)),
            Callback::Bound(f) => Ok(f(input, &self.args)),
            Callback::Dispatch {
                dispatcher,
                target,
                operation,
            } => {
                let mut call_args = Vec::with_capacity(self.args.len() + 1);
                call_args.push(input);
                call_args.extend(self.args.iter().cloned());
                dispatcher.invoke(target, operation, call_args)
            }
        }
    }
}
