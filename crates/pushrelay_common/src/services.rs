// --- File: crates/pushrelay_common/src/services.rs ---
//! Shared plumbing for the service seams.
//!
//! The store backend and the provider clients are traits returning boxed
//! futures so they can sit behind `Arc<dyn Trait>` and be swapped for test
//! doubles.

use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;
