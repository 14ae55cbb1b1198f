// Pipelines — the full comparison recompute and the debounced explore loop.

pub mod compare;
pub mod debounce;
pub mod explore;
