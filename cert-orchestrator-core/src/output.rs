//! Deferred values
//!
//! An [`Output<T>`] is a value that becomes available once upstream work
//! resolves: the identifier of a requested certificate, the list of
//! records created for it, and so on. Outputs are lazy (nothing runs until
//! someone awaits them), memoised (the underlying work runs at most once no
//! matter how many consumers there are) and cheap to clone.
//!
//! ```rust
//! use cert_orchestrator_core::Output;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> cert_orchestrator_core::CoreResult<()> {
//! let domain = Output::new("example.com".to_string());
//! let wildcard = domain.apply(|d| format!("*.{d}"));
//! let both = domain.zip(&wildcard);
//! assert_eq!(
//!     both.resolve().await?,
//!     ("example.com".to_string(), "*.example.com".to_string())
//! );
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, Shared, try_join_all};
use futures::{FutureExt, try_join};

use crate::error::{CoreError, CoreResult};

/// A lazily evaluated, memoised value that may fail.
pub struct Output<T> {
    inner: Shared<BoxFuture<'static, CoreResult<T>>>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// An already known value.
    pub fn new(value: T) -> Self {
        Self::from_future(async move { Ok(value) })
    }

    /// A value produced by `future`, run on first use.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = CoreResult<T>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// A value that will never be available.
    pub fn failed(error: CoreError) -> Self {
        Self::from_future(async move { Err(error) })
    }

    /// Map the value once it resolves.
    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let inner = self.inner.clone();
        Output::from_future(async move { inner.await.map(f) })
    }

    /// Run more (possibly failing) async work on the value once it resolves.
    pub fn and_then<U, F, Fut>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = CoreResult<U>> + Send + 'static,
    {
        let inner = self.inner.clone();
        Output::from_future(async move { f(inner.await?).await })
    }

    /// Both values, once both resolve.
    pub fn zip<U>(&self, other: &Output<U>) -> Output<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let (a, b) = (self.inner.clone(), other.inner.clone());
        Output::from_future(async move { try_join!(a, b) })
    }

    /// Every value of the set, in order. Fails with the first failure.
    pub fn all<I>(outputs: I) -> Output<Vec<T>>
    where
        I: IntoIterator<Item = Output<T>>,
    {
        let inner: Vec<_> = outputs.into_iter().map(|o| o.inner).collect();
        Output::from_future(async move { try_join_all(inner).await })
    }

    /// Keep only completion (or failure), dropping the value.
    pub fn void(&self) -> Output<()> {
        self.apply(|_| ())
    }

    /// Wait for the value.
    pub async fn resolve(&self) -> CoreResult<T> {
        self.inner.clone().await
    }

    /// The result if it is already known, without driving any work.
    pub fn peek(&self) -> Option<CoreResult<T>> {
        self.inner.peek().cloned()
    }
}

impl<T> From<T> for Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Output<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl<T: Clone> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.peek() {
            None => "pending",
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("Output").field("state", &state).finish()
    }
}
