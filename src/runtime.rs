//! Sync entry points for async work.
//!
//! Synthesis and photo fetches are async, but the pipeline is driven from plain sync code
//! and sometimes from inside a caller's Tokio runtime. Blocking on a runtime from one of its
//! own threads panics, so when a scheduler is already active the future runs on a scoped
//! worker thread that owns a fresh current-thread runtime and the caller joins it.

use std::{future::Future, io};

/// Whether the calling thread is inside a Tokio runtime.
pub fn scheduler_active() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

/// Run the future built by `make` to completion and return its output.
///
/// The future is constructed on whichever thread drives it, so it does not need to be `Send`.
pub fn block_on<F, Fut, T>(make: F) -> io::Result<T>
where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = T>,
    T: Send,
{
    if !scheduler_active() {
        return run_local(make);
    }

    tracing::debug!("runtime active on caller thread, bridging through a worker");
    std::thread::scope(|scope| {
        let worker = std::thread::Builder::new()
            .name("gridcast-bridge".to_string())
            .spawn_scoped(scope, move || run_local(make))?;
        worker
            .join()
            .map_err(|_| io::Error::other("bridge worker panicked"))?
    })
}

fn run_local<F, Fut, T>(make: F) -> io::Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(make()))
}
