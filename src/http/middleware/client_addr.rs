//! Real client address resolution.
//!
//! Reads: `True-Client-IP`, `X-Real-IP`, `X-Forwarded-For` (first hop), then
//! the socket peer from `ConnectInfo`.
//! Writes: a [`ClientAddr`] request extension.
//!
//! Proxy headers are trusted unconditionally. Rate limiting and CORS live in
//! the fronting proxy, which is expected to overwrite them.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

const TRUE_CLIENT_IP: &str = "true-client-ip";
const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolved client address. `None` when neither headers nor socket info are available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientAddr(pub Option<IpAddr>);

impl ClientAddr {
    pub fn ip(&self) -> Option<IpAddr> {
        self.0
    }
}

impl fmt::Display for ClientAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ip) => write!(f, "{}", ip),
            None => f.write_str("unknown"),
        }
    }
}

pub async fn resolve_client_addr(mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let resolved = forwarded_ip(request.headers()).or(peer);
    request.extensions_mut().insert(ClientAddr(resolved));

    next.run(request).await
}

/// Client IP claimed by proxy headers, in precedence order. Unparseable values are skipped.
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let candidates = [
        header(TRUE_CLIENT_IP),
        header(X_REAL_IP),
        header(X_FORWARDED_FOR).and_then(|v| v.split(',').next()),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.trim().parse::<IpAddr>().ok())
}
