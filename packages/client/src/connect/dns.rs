//! Host resolution for remote and local endpoints

use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::str::FromStr;

/// Resolve `host` to socket addresses, skipping DNS for IP literals.
///
/// # Errors
///
/// Returns the resolver error, or `NotFound` when resolution succeeds but
/// yields no address.
pub fn resolve_host_sync(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    if let Ok(ip) = IpAddr::from_str(host.trim_start_matches('[').trim_end_matches(']')) {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses resolved for {host}"),
        ));
    }
    Ok(addrs)
}
