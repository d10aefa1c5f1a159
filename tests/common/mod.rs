//! In-process sort peer shared by the integration tests

#![allow(dead_code)]

use globesort_bench::protocol::{read_frame, write_frame, Request, Response, SortOutcome};
use globesort_bench::types::Endpoint;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How the peer answers `SortIntegers`
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Sort and report the given server-side duration
    Sort { nano_seconds: i64 },
    /// Answer with an error status
    Reject { code: u32, message: String },
    /// Sort but drop the last value
    Truncate,
}

pub struct MockSortServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MockSortServer {
    pub async fn start(behavior: Behavior) -> Self {
        Self::start_with_linger(behavior, Duration::ZERO).await
    }

    /// Keep each socket open for `linger` after the client half-closes
    pub async fn start_with_linger(behavior: Behavior, linger: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, behavior.clone(), linger));
            }
        });

        Self { addr, handle }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("127.0.0.1", self.port()).unwrap()
    }
}

impl Drop for MockSortServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Answer frames until the client hangs up
async fn serve(mut socket: TcpStream, behavior: Behavior, linger: Duration) {
    while let Ok(frame) = read_frame(&mut socket, u32::MAX as usize).await {
        let reply = match Request::decode(&frame) {
            Ok(Request::Ping) => Response::Empty,
            Ok(Request::SortIntegers(values)) => sort_reply(values, &behavior),
            Err(e) => Response::Error { code: 3, message: e.to_string() },
        };
        if write_frame(&mut socket, &reply.encode()).await.is_err() {
            break;
        }
    }
    tokio::time::sleep(linger).await;
}

fn sort_reply(mut values: Vec<i32>, behavior: &Behavior) -> Response {
    match behavior {
        Behavior::Sort { nano_seconds } => {
            values.sort_unstable();
            Response::SortOutcome(SortOutcome { values, nano_seconds: *nano_seconds })
        }
        Behavior::Reject { code, message } => Response::Error {
            code: *code,
            message: message.clone(),
        },
        Behavior::Truncate => {
            values.sort_unstable();
            values.pop();
            Response::SortOutcome(SortOutcome { values, nano_seconds: 0 })
        }
    }
}

/// Start a peer on its own runtime thread, for tests that drive the binary
pub fn spawn_background_server(behavior: Behavior) -> u16 {
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let server = MockSortServer::start(behavior).await;
            tx.send(server.port()).unwrap();
            std::future::pending::<()>().await;
        });
    });

    rx.recv().unwrap()
}

/// A local port with nothing listening on it
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
