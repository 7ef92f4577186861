//! Request guards applied to the whole router.

mod csrf;
mod rate_limit;

pub use csrf::csrf;
pub use rate_limit::{RateLimitDecision, RateLimiter, rate_limit};
