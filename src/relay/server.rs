// SPDX-License-Identifier: MPL-2.0

use crate::relay::RelayError;
use crate::relay::push::PushDelivery;
use crate::relay::routes::{self, MAX_BODY_BYTES, RelayResponse};
use crate::runtime;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use tiny_http::{Header, Request, Response, Server};

static RESPONSE_HEADERS: Lazy<Vec<Header>> = Lazy::new(|| {
    [
        ("Content-Type", "application/json; charset=utf-8"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET,HEAD,PUT,PATCH,POST,DELETE"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ]
    .into_iter()
    .map(|(name, value)| {
        Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header is valid")
    })
    .collect()
});

/// Serve relay requests on `addr` until the listener shuts down. Requests are
/// handled one at a time; push delivery runs on the shared runtime.
pub fn serve<P: PushDelivery>(addr: SocketAddr, push: &P) -> Result<(), RelayError> {
    let server = Server::http(addr).map_err(|e| RelayError::Bind(e.to_string()))?;
    tracing::info!("relay running on http://{addr}");

    for mut request in server.incoming_requests() {
        let method = request.method().as_str().to_string();
        let url = request.url().to_string();

        let response = match routes::read_limited(request.as_reader(), MAX_BODY_BYTES) {
            Ok(Some(body)) => runtime::block_on(routes::handle(push, &method, &url, &body)),
            Ok(None) => RelayResponse::payload_too_large(),
            Err(e) => {
                tracing::warn!("failed to read request body: {e}");
                RelayResponse::bad_request()
            }
        };

        tracing::debug!(%method, %url, status = response.status, "relay request");
        respond(request, response);
    }
    Ok(())
}

fn respond(request: Request, response: RelayResponse) {
    let mut out = Response::from_string(response.body_text()).with_status_code(response.status);
    for header in RESPONSE_HEADERS.iter() {
        out.add_header(header.clone());
    }
    if let Err(e) = request.respond(out) {
        tracing::warn!("failed to write relay response: {e}");
    }
}
