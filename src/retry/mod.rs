//! Retry policy: attempt budgets and exponential backoff.

mod policy;

pub use policy::RetryPolicy;
