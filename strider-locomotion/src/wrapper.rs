//! Wrappers transforming the observations and actions of a wrapped environment.
//!
//! A wrapper owns the environment it wraps and implements [`Env`](strider_core::Env)
//! itself, delegating `reset` and `step` downwards. Wrappers are applied once, at
//! construction, and the resulting chain never changes.
mod flatten;
mod trajectory;
pub use flatten::ObsDictToArrayWrapper;
pub use trajectory::TrajectoryGeneratorWrapper;
