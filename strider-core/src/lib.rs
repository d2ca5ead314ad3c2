#![warn(missing_docs)]
//! Core traits of composable locomotion environments.
//!
//! The main entities are an environment ([`Env`]), its observation ([`Obs`]) and action
//! ([`Act`]), and a policy ([`Policy`]) mapping observations to actions:
//!
//! ```text
//! Env --> Obs --> Policy --> Act --> Env
//! ```
//!
//! An environment may wrap another environment, transforming observations and/or actions
//! on the way through. Every layer of such a chain implements [`Env`], so the caller only
//! ever talks to the outermost one.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Env, Info, Obs, Policy, Step};

mod space;
pub use space::BoxSpace;
