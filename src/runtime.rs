// SPDX-License-Identifier: MPL-2.0

//! Shared async runtime for store queries and push delivery.
//!
//! The CLI and the relay server are synchronous at the edges; both hand their
//! network work to this single runtime instead of building one per call.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::Runtime;

/// Two workers are enough: every task here is I/O bound.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("guia-async")
        .build()
        .expect("failed to create async runtime")
});

/// Execute a future on the shared runtime, blocking until completion.
/// Must not be called from inside the runtime itself.
pub fn block_on<F: Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}
