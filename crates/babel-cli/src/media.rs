//! UDP media adapter.
//!
//! Each stream is a UDP socket bound to the local RTP port and connected to
//! the peer's endpoint. Packetization and audio devices are out of scope;
//! the socket is what the handle owns.

use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
};

use babel_core::{MediaEndpoint, MediaError, MediaHandle};
use tokio::net::UdpSocket;

/// Opens and closes RTP sockets.
pub struct UdpMedia {
    bind_ip: IpAddr,
    rtp_port: u16,
    streams: HashMap<u64, UdpSocket>,
    next_id: u64,
}

impl UdpMedia {
    /// Adapter binding `bind_ip:rtp_port` for every stream.
    pub fn new(bind_ip: IpAddr, rtp_port: u16) -> Self {
        Self { bind_ip, rtp_port, streams: HashMap::new(), next_id: 0 }
    }

    /// Bind the RTP port and connect it to `endpoint`.
    ///
    /// # Errors
    ///
    /// [`MediaError::Bind`] if the port is taken, [`MediaError::Connect`] if
    /// the endpoint is unreachable.
    pub async fn start(&mut self, endpoint: MediaEndpoint) -> Result<MediaHandle, MediaError> {
        let local = SocketAddr::new(self.bind_ip, self.rtp_port);
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| MediaError::Bind { port: self.rtp_port, reason: e.to_string() })?;

        socket
            .connect(SocketAddr::new(endpoint.address, endpoint.port))
            .await
            .map_err(|e| MediaError::Connect { endpoint, reason: e.to_string() })?;

        self.next_id += 1;
        let id = self.next_id;
        tracing::debug!(id, local = %local, remote = %endpoint, "rtp socket open");
        self.streams.insert(id, socket);
        Ok(MediaHandle::new(id, endpoint))
    }

    /// Close the socket behind `handle`.
    pub fn stop(&mut self, handle: MediaHandle) {
        match self.streams.remove(&handle.id()) {
            Some(_) => tracing::debug!(id = handle.id(), "rtp socket closed"),
            None => tracing::debug!(id = handle.id(), "stream already closed"),
        }
    }

    /// Close every socket.
    pub fn stop_all(&mut self) {
        self.streams.clear();
    }

    /// Number of open streams.
    pub fn active(&self) -> usize {
        self.streams.len()
    }

    /// Local address of an open stream.
    pub fn local_addr(&self, handle: &MediaHandle) -> Option<SocketAddr> {
        self.streams.get(&handle.id()).and_then(|socket| socket.local_addr().ok())
    }
}
