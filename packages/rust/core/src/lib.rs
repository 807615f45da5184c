//! Function chaining for Rinku.
//!
//! Build a [`Chain`] from a seed value and a sequence of links, run it, and
//! read back the final [`Outcome`] or any named intermediate result. A link
//! returning a failure signal stops the chain.
//!
//! Declarative pipelines ([`pipeline`]) build chains whose links dispatch to
//! named operations in a [`Registry`]; [`builtins`] provides the standard one.

pub mod builtins;
pub mod chain;
pub mod dispatch;
pub mod link;
pub mod outcome;
pub mod pipeline;

pub use chain::{Chain, Resolved};
pub use dispatch::{Arity, Dispatch, OperationInfo, Registry};
pub use link::{Callback, Link};
pub use outcome::{Failure, Outcome};
pub use pipeline::{PipelineReport, PipelineRun, StepReport, build_chain, run_pipeline};
