//! Client endpoint.
//!
//! Connects to a server by host and port, optionally from a chosen local IP
//! so that several clients on one machine present different identities.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpSocket, TcpStream};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::net::{exchange, Connection, ConnectionSlot};

pub struct Client {
    host: String,
    port: u16,
    local_ip: Option<IpAddr>,
    connect_timeout: Duration,
    slot: ConnectionSlot<TcpStream>,
}

impl Client {
    pub fn new(host: impl Into<String>, port: u16, config: &ClientConfig) -> Self {
        Self {
            host: host.into(),
            port,
            local_ip: None,
            connect_timeout: config.connect_timeout(),
            slot: ConnectionSlot::new(),
        }
    }

    /// Connect from `ip` instead of the address the OS picks.
    pub fn bind_local(mut self, ip: IpAddr) -> Self {
        self.local_ip = Some(ip);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.slot.is_occupied()
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn open(&self) -> std::io::Result<(TcpStream, SocketAddr)> {
        let addr = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "host resolved to no addresses")
            })?;

        let stream = match self.local_ip {
            Some(ip) => {
                let socket = if addr.is_ipv4() {
                    TcpSocket::new_v4()?
                } else {
                    TcpSocket::new_v6()?
                };
                socket.bind(SocketAddr::new(ip, 0))?;
                socket.connect(addr).await?
            }
            None => TcpStream::connect(addr).await?,
        };
        Ok((stream, addr))
    }
}

#[async_trait]
impl Endpoint for Client {
    type Inbound = Vec<u8>;

    async fn connect(&mut self) -> Result<()> {
        let target = self.target();
        let (stream, addr) = match tokio::time::timeout(self.connect_timeout, self.open()).await {
            Ok(Ok(opened)) => opened,
            Ok(Err(source)) => return Err(Error::Connect { addr: target, source }),
            Err(_) => {
                return Err(Error::ConnectTimedOut {
                    addr: target,
                    timeout: self.connect_timeout,
                })
            }
        };

        let connection = Connection::new(stream, addr);
        tracing::debug!(connection_id = %connection.id(), server = %addr, "Connected to server");
        self.slot.occupy(connection);
        Ok(())
    }

    async fn write(&mut self, payload: &[u8]) -> Result<()> {
        exchange::write_to(&mut self.slot, payload).await?;
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>> {
        Ok(exchange::read_from(&mut self.slot).await?)
    }

    fn disconnect(&mut self) {
        self.slot.close();
    }
}
