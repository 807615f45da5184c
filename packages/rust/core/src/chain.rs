//! The chain: build a list of links, run them in order, inspect results.
//!
//! ```
//! use rinku_core::{Chain, Outcome};
//!
//! let chain = Chain::new(1)
//!     .link(|x: i64| Outcome::Ok(x + 1))
//!     .link(|x: i64| Outcome::Ok(x + 1))
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(chain.result(), &Outcome::Ok(3));
//! ```
//!
//! A link that returns [`Outcome::Error`] halts the run; the failure becomes
//! the chain's result and the remaining links stay pending, unexecuted.
//!
//! Steps are named with [`Chain::link_named`], or by pushing a link built
//! with [`Link::named`]. Names are not required to be unique. When several
//! resolved steps share a name, [`Chain::link_result`] returns the most
//! recently resolved one.
//!
//! Appending links to a completed chain and running it again re-executes
//! every link from the seed, producing a fresh resolved history.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use rinku_shared::{DEFAULT_SEED_NAME, Result, RinkuError};

use crate::dispatch::Dispatch;
use crate::link::Link;
use crate::outcome::{Failure, Outcome};

/// Record of one executed step (or the seed).
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<V> {
    name: Option<String>,
    result: Outcome<V>,
}

impl<V> Resolved<V> {
    /// `None` for anonymous links.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn result(&self) -> &Outcome<V> {
        &self.result
    }
}

/// A pipeline of links plus the history of resolved ones.
#[derive(Debug, Clone)]
pub struct Chain<V> {
    links: Vec<Link<V>>,
    /// Links `..cursor` have executed in the current resolution pass.
    cursor: usize,
    resolved: Vec<Resolved<V>>,
    result: Outcome<V>,
}

impl<V: Clone + 'static> Chain<V> {
    /// Start a chain whose seed is recorded under the default `seed` name.
    pub fn new(seed: V) -> Self {
        Self::named(seed, DEFAULT_SEED_NAME)
    }

    /// Start a chain whose seed is recorded under `name`.
    pub fn named(seed: V, name: impl Into<String>) -> Self {
        Self {
            links: Vec::new(),
            cursor: 0,
            resolved: vec![Resolved {
                name: Some(name.into()),
                result: Outcome::Ok(seed.clone()),
            }],
            result: Outcome::Ok(seed),
        }
    }

    /// Append a link that calls `f(input)`.
    pub fn link<F, R>(self, f: F) -> Self
    where
        F: Fn(V) -> R + Send + Sync + 'static,
        R: Into<Outcome<V>>,
    {
        self.push(Link::unary(f))
    }

    /// Append a link that calls `f(input)` and records its result under `name`.
    pub fn link_named<F, R>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(V) -> R + Send + Sync + 'static,
        R: Into<Outcome<V>>,
    {
        self.push(Link::unary(f).named(name))
    }

    /// Append a link that calls `f(input, args)`.
    pub fn link_with<F, R>(self, f: F, args: Vec<V>) -> Self
    where
        F: Fn(V, &[V]) -> R + Send + Sync + 'static,
        R: Into<Outcome<V>>,
    {
        self.push(Link::with_args(f, args))
    }

    /// Append a link that invokes `target.operation(input, args...)` via
    /// `dispatcher` when the chain runs.
    pub fn link_dispatch(
        self,
        dispatcher: Arc<dyn Dispatch<V>>,
        target: impl Into<String>,
        operation: impl Into<String>,
        args: Vec<V>,
    ) -> Self {
        self.push(Link::dispatch(dispatcher, target, operation, args))
    }

    /// Append an already-built (possibly named) link.
    pub fn push(mut self, link: Link<V>) -> Self {
        self.links.push(link);
        self
    }

    /// Resolve links in insertion order.
    ///
    /// Each link receives the current result as its input. Resolution stops
    /// at the first failure signal; a chain that has halted does not resume
    /// on a later `run`. A completed chain with newly appended links starts
    /// over from the seed and re-executes every link. Dispatch faults
    /// (unknown operation, arity mismatch, an operation erroring) abort the
    /// run and are returned as `Err`.
    #[instrument(skip_all, fields(links = self.links.len(), pending = self.pending()))]
    pub fn run(mut self) -> Result<Self> {
        if self.is_halted() {
            debug!(pending = self.pending(), "chain already halted, not resuming");
            return Ok(self);
        }

        if self.cursor > 0 && self.pending() > 0 {
            debug!(executed = self.cursor, "links appended after a run, restarting from seed");
            self.resolved.truncate(1);
            self.result = self.resolved[0].result.clone();
            self.cursor = 0;
        }

        while let Outcome::Ok(input) = &self.result {
            let Some(link) = self.links.get(self.cursor) else {
                break;
            };

            let outcome = link.invoke(input.clone())?;
            let step = self.resolved.len();
            self.cursor += 1;

            match &outcome {
                Outcome::Ok(_) => {
                    debug!(step, name = link.name(), "link resolved");
                }
                Outcome::Error(failure) => {
                    info!(
                        step,
                        name = link.name(),
                        arity = failure.arity(),
                        skipped = self.links.len() - self.cursor,
                        "link returned a failure signal, halting"
                    );
                }
            }

            self.resolved.push(Resolved {
                name: link.name.clone(),
                result: outcome.clone(),
            });
            self.result = outcome;
        }

        Ok(self)
    }
}

impl<V> Chain<V> {
    /// Latest result: the seed, the last link's value, or the halting failure.
    pub fn result(&self) -> &Outcome<V> {
        &self.result
    }

    pub fn into_result(self) -> Outcome<V> {
        self.result
    }

    /// Result of the step recorded under `name`.
    ///
    /// Anonymous steps are never matched. Duplicate names resolve to the
    /// most recent match.
    pub fn link_result(&self, name: &str) -> Result<&Outcome<V>> {
        self.resolved
            .iter()
            .rev()
            .find(|step| step.name.as_deref() == Some(name))
            .map(|step| &step.result)
            .ok_or_else(|| RinkuError::step_not_found(name))
    }

    /// Seed plus every executed step, in execution order.
    pub fn resolved(&self) -> &[Resolved<V>] {
        &self.resolved
    }

    /// Links not executed in the current resolution pass.
    pub fn pending(&self) -> usize {
        self.links.len() - self.cursor
    }

    /// `true` once a link has returned a failure signal.
    pub fn is_halted(&self) -> bool {
        self.result.is_error()
    }

    /// The halting failure, if the chain stopped early.
    pub fn failure(&self) -> Option<&Failure<V>> {
        self.result.failure()
    }
}

impl<V: Clone + Default + 'static> Default for Chain<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}
