//! Composable legged-locomotion environments for reinforcement learning.
//!
//! Strider consists of the following crates:
//!
//! * [strider-core](strider_core) provides the environment, observation, action and
//!   policy traits, box spaces, per-step records and an evaluation loop.
//! * [strider-locomotion](strider_locomotion) builds locomotion environments from a
//!   robot, sensors, a task and wrappers.
//! * This crate re-exports both and adds simple policies and the rollout driver behind
//!   the `rollout` binary.
pub mod policy;
pub mod rollout;
pub use strider_core;
pub use strider_locomotion as locomotion;
