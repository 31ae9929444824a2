// SPDX-License-Identifier: MPL-2.0

//! HTTP relay that accepts browser push subscriptions and forwards
//! notifications through the Web Push protocol.

mod client;
mod push;
mod routes;
mod server;

pub use client::{SUBSCRIBE_FAILED, subscribe};
pub use push::{PushDelivery, PushError, WebPushDelivery};
pub use routes::{MAX_BODY_BYTES, RelayResponse, handle};
pub use server::serve;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("failed to bind relay: {0}")]
    Bind(String),
    #[error("push setup failed: {0}")]
    Push(#[from] PushError),
}
