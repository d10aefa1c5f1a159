//! Connection management for the remote sort service
//!
//! A [`Connection`] owns the single plaintext TCP session to the peer. The
//! socket is dialled by the first RPC, so an unreachable peer surfaces as a
//! connectivity failure from that call rather than from construction.

use crate::{
    error::{AppError, Result},
    logging::Logger,
    protocol::{self, Response, SortOutcome},
    types::Endpoint,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// The two RPCs offered by a GlobeSort server
#[async_trait]
pub trait SortService: Send {
    /// Empty round trip
    async fn ping(&mut self) -> Result<()>;

    /// Submit a batch and wait for the sorted result
    async fn sort_integers(&mut self, values: &[i32]) -> Result<SortOutcome>;
}

/// Transport limits applied to a connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionOptions {
    /// Largest inbound frame accepted, in bytes
    pub max_message_size: usize,
    /// Deadline applied to each RPC, none to wait indefinitely
    pub deadline: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            max_message_size: crate::defaults::DEFAULT_MAX_MESSAGE_SIZE,
            deadline: None,
        }
    }
}

/// How teardown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeardownStatus {
    /// Peer acknowledged the shutdown by closing its side within the timeout
    Graceful,
    /// Timeout elapsed; the socket was dropped anyway
    TimedOut,
    /// Shutdown reported an error; the socket was dropped anyway
    Aborted,
    /// No RPC ever dialled the peer
    NeverConnected,
    /// `close` had already run
    AlreadyClosed,
}

/// Single session to the sort server
pub struct Connection {
    endpoint: Endpoint,
    options: ConnectionOptions,
    stream: Option<TcpStream>,
    closed: bool,
    requests_sent: u64,
    logger: Logger,
}

impl Connection {
    /// Create the session. No network activity happens until the first RPC.
    pub fn open(endpoint: Endpoint, options: ConnectionOptions, logger: Logger) -> Self {
        Self {
            endpoint,
            options,
            stream: None,
            closed: false,
            requests_sent: 0,
            logger,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Request frames fully written to the socket
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }

    /// Shut the session down, waiting at most `timeout` for the peer to close
    /// its side.
    ///
    /// Never fails: whatever happens, the socket is dropped afterwards.
    pub async fn close(&mut self, timeout: Duration) -> TeardownStatus {
        if self.closed {
            return TeardownStatus::AlreadyClosed;
        }
        self.closed = true;

        let Some(mut stream) = self.stream.take() else {
            crate::log_debug!(self.logger, "Closing {} (never connected)", self.endpoint);
            return TeardownStatus::NeverConnected;
        };

        let status = match tokio::time::timeout(timeout, drain_until_closed(&mut stream)).await {
            Ok(Ok(())) => TeardownStatus::Graceful,
            Ok(Err(e)) => {
                self.logger.warn(&format!("Shutdown of {} failed: {}", self.endpoint, e))
                    .field("endpoint", self.endpoint.to_string())
                    .log()
                    .await;
                TeardownStatus::Aborted
            }
            Err(_) => {
                self.logger.warn(&format!("Shutdown of {} did not finish within {}ms", self.endpoint, timeout.as_millis()))
                    .field("endpoint", self.endpoint.to_string())
                    .field("timeout_ms", timeout.as_millis() as u64)
                    .log()
                    .await;
                TeardownStatus::TimedOut
            }
        };

        crate::log_debug!(self.logger, "Connection to {} closed ({:?})", self.endpoint, status);
        status
    }

    async fn connected_stream(&mut self) -> Result<&mut TcpStream> {
        if self.closed {
            return Err(AppError::connectivity(format!("Connection to {} is closed", self.endpoint)));
        }

        if self.stream.is_none() {
            let stream = TcpStream::connect(self.endpoint.authority())
                .await
                .map_err(|e| AppError::connectivity(format!("Failed to connect to {}: {}", self.endpoint, e)))?;
            stream.set_nodelay(true)?;

            self.logger.debug(&format!("Connected to {}", self.endpoint))
                .field("endpoint", self.endpoint.to_string())
                .field("local_addr", stream.local_addr().ok().map(|a| a.to_string()))
                .log()
                .await;

            self.stream = Some(stream);
        }

        self.stream
            .as_mut()
            .ok_or_else(|| AppError::internal("stream missing after connect"))
    }

    async fn exchange(&mut self, frame: &[u8]) -> Result<Response> {
        let max_len = self.options.max_message_size;
        let stream = self.connected_stream().await?;

        protocol::write_frame(stream, frame).await?;
        self.requests_sent += 1;

        let stream = self.connected_stream().await?;
        let reply = protocol::read_frame(stream, max_len).await?;
        Response::decode(&reply)?.into_result()
    }

    async fn call(&mut self, frame: &[u8]) -> Result<Response> {
        match self.options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.exchange(frame))
                .await
                .map_err(|_| AppError::timeout(format!(
                    "No response from {} within {}s",
                    self.endpoint,
                    deadline.as_secs()
                )))?,
            None => self.exchange(frame).await,
        }
    }
}

/// Half-close the write side, then discard inbound bytes until the peer closes
async fn drain_until_closed(stream: &mut TcpStream) -> std::io::Result<()> {
    stream.shutdown().await?;

    let mut scratch = [0u8; 4096];
    while stream.read(&mut scratch).await? != 0 {}
    Ok(())
}

#[async_trait]
impl SortService for Connection {
    async fn ping(&mut self) -> Result<()> {
        match self.call(&protocol::encode_ping()).await? {
            Response::Empty => Ok(()),
            other => Err(AppError::protocol(format!("Unexpected reply to Ping: {:?}", other))),
        }
    }

    async fn sort_integers(&mut self, values: &[i32]) -> Result<SortOutcome> {
        let frame = protocol::encode_sort_request(values)?;
        match self.call(&frame).await? {
            Response::SortOutcome(outcome) => Ok(outcome),
            Response::Empty => Err(AppError::protocol("Unexpected empty reply to SortIntegers")),
            other => Err(AppError::protocol(format!("Unexpected reply to SortIntegers: {:?}", other))),
        }
    }
}
