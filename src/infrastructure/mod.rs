// Infrastructure for exprkey: identity cache, context pooling, thread pool setup.

pub mod cache;
pub mod concurrency;
pub mod pool;

pub use cache::IdentityCache;
pub use pool::{with_context, ExecutionContext};
