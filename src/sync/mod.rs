//! Timing and ordering for remote calls: the debounced write-behind channel
//! and the request lifecycles.

pub mod debounce;
pub mod lifecycle;
