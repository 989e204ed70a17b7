//! Web server command.

use std::net::{SocketAddr, ToSocketAddrs};

use console::style;

use crate::config::Config;

const DEFAULT_PORT: u16 = 8501;

/// Start the web server.
pub async fn cmd_serve(config: Config, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind);
    let addr = resolve(&host, port)?;

    println!(
        "{} Starting imgtext server at http://{}",
        style("→").cyan(),
        addr
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(config, addr).await
}

fn resolve(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow::anyhow!("Could not resolve bind address {}:{}", host, port))
}

/// Parse a bind address that can be:
/// - Just a port: "8080" -> 127.0.0.1:8080
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8501
/// - Host and port: "0.0.0.0:8080" -> 0.0.0.0:8080
fn parse_bind_address(bind: &str) -> (String, u16) {
    if let Ok(port) = bind.parse::<u16>() {
        return ("127.0.0.1".to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.trim_matches(['[', ']']).to_string(), port);
        }
    }

    (bind.to_string(), DEFAULT_PORT)
}
