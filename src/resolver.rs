//! SRV record resolution for the `_minecraft._tcp.<host>` convention,
//! letting callers connect with `(host, default_port)` the way the
//! official launcher does and have the real host/port discovered for them.

use std::net::IpAddr;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use crate::error::ClientError;

/// The default Java Edition port, used when no SRV record resolves and the
/// caller didn't specify one.
pub const DEFAULT_PORT: u16 = 25565;

/// Resolves `host` to the address/port a connection should actually be
/// made to. Literal IP addresses are returned unchanged. Otherwise, an SRV
/// lookup for `_minecraft._tcp.<host>` is attempted; its target and port
/// are used on a hit, and `(host, DEFAULT_PORT)` otherwise.
pub async fn resolve(host: &str) -> Result<(String, u16), ClientError> {
    if host.parse::<IpAddr>().is_ok() {
        return Ok((host.to_string(), DEFAULT_PORT));
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    let query = format!("_minecraft._tcp.{host}");

    match resolver.srv_lookup(query.clone()).await {
        Ok(lookup) => match lookup.iter().next() {
            Some(record) => {
                let target = record.target().to_utf8();
                let target = target.trim_end_matches('.').to_string();
                debug!(%query, %target, port = record.port(), "resolved SRV record");
                Ok((target, record.port()))
            }
            None => Ok((host.to_string(), DEFAULT_PORT)),
        },
        Err(err) => {
            debug!(%query, error = %err, "no SRV record, falling back to literal host");
            Ok((host.to_string(), DEFAULT_PORT))
        }
    }
}
