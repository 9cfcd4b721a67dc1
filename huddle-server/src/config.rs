use anyhow::{Context, Result};
use huddle_core::IceServerConfig;
use huddle_core::utils::default_ice_servers;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 5000;

/// Relay settings, read from the process environment.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Announced to every client in its `welcome` envelope.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            ice_servers: default_ice_servers(),
        }
    }
}

impl RelayConfig {
    /// `PORT`, `HOST`, and an optional `TURN_URL` with `TURN_USERNAME` /
    /// `TURN_CREDENTIAL`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        }

        if let Ok(host) = env::var("HOST") {
            config.host = host
                .parse()
                .with_context(|| format!("HOST must be an IP address, got '{}'", host))?;
        }

        if let Ok(turn_url) = env::var("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: env::var("TURN_USERNAME").ok(),
                credential: env::var("TURN_CREDENTIAL").ok(),
            });
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
