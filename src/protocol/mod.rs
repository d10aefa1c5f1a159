//! GlobeSort wire protocol
//!
//! Every message travels as one frame:
//!
//! ```text
//! +----------------+--------+------------------+
//! | len: u32 (LE)  | opcode | payload          |
//! +----------------+--------+------------------+
//!                  |<------- len bytes ------->|
//! ```
//!
//! Requests are `Ping` (empty payload) and `SortIntegers` (`u32` count then
//! `count` little-endian `i32`s). Responses are `Empty`, `SortOutcome`
//! (`i64` server nanoseconds, `u32` count, `count` `i32`s) and `Error`
//! (`u32` status code, UTF-8 message).

use crate::error::{AppError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const OP_PING: u8 = 0x01;
pub const OP_SORT_INTEGERS: u8 = 0x02;
pub const OP_EMPTY: u8 = 0x81;
pub const OP_SORT_OUTCOME: u8 = 0x82;
pub const OP_ERROR: u8 = 0xFF;

/// Bytes taken by the length prefix
pub const LENGTH_PREFIX_LEN: usize = 4;

const OPCODE_LEN: usize = 1;
const COUNT_LEN: usize = 4;
const NANOS_LEN: usize = 8;
const INT_LEN: usize = 4;

/// Largest batch whose request frame length still fits the `u32` prefix
pub const MAX_BATCH_LEN: usize = (u32::MAX as usize - OPCODE_LEN - COUNT_LEN) / INT_LEN;

/// A decoded frame: opcode plus raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Length on the wire including the prefix
    pub fn wire_len(&self) -> usize {
        LENGTH_PREFIX_LEN + OPCODE_LEN + self.payload.len()
    }
}

/// Requests sent by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Ping,
    SortIntegers(Vec<i32>),
}

/// Server answer to `SortIntegers`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    /// The sorted sequence
    pub values: Vec<i32>,
    /// Time the server reports spending on the sort
    pub nano_seconds: i64,
}

/// Responses sent by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Empty,
    SortOutcome(SortOutcome),
    Error { code: u32, message: String },
}

/// Frame for an empty probe
pub fn encode_ping() -> Vec<u8> {
    encode_frame(OP_PING, &[])
}

/// Frame for a sort request, encoded straight from a borrowed batch
pub fn encode_sort_request(values: &[i32]) -> Result<Vec<u8>> {
    if values.len() > MAX_BATCH_LEN {
        return Err(AppError::validation(format!(
            "Batch of {} values exceeds the {} value frame limit",
            values.len(),
            MAX_BATCH_LEN
        )));
    }

    let mut payload = Vec::with_capacity(COUNT_LEN + values.len() * INT_LEN);
    payload.extend_from_slice(&(values.len() as u32).to_le_bytes());
    put_i32s(&mut payload, values);
    Ok(encode_frame(OP_SORT_INTEGERS, &payload))
}

impl Request {
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Request::Ping => Ok(encode_ping()),
            Request::SortIntegers(values) => encode_sort_request(values),
        }
    }

    pub fn decode(frame: &Frame) -> Result<Self> {
        let mut payload = frame.payload.as_slice();
        match frame.opcode {
            OP_PING => {
                expect_consumed(payload, "Ping")?;
                Ok(Request::Ping)
            }
            OP_SORT_INTEGERS => {
                let count = take_u32(&mut payload)? as usize;
                let values = take_i32s(&mut payload, count)?;
                expect_consumed(payload, "SortIntegers")?;
                Ok(Request::SortIntegers(values))
            }
            other => Err(AppError::protocol(format!("Unknown request opcode 0x{:02X}", other))),
        }
    }
}

impl Response {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Response::Empty => encode_frame(OP_EMPTY, &[]),
            Response::SortOutcome(outcome) => {
                let mut payload =
                    Vec::with_capacity(NANOS_LEN + COUNT_LEN + outcome.values.len() * INT_LEN);
                payload.extend_from_slice(&outcome.nano_seconds.to_le_bytes());
                payload.extend_from_slice(&(outcome.values.len() as u32).to_le_bytes());
                put_i32s(&mut payload, &outcome.values);
                encode_frame(OP_SORT_OUTCOME, &payload)
            }
            Response::Error { code, message } => {
                let mut payload = Vec::with_capacity(COUNT_LEN + message.len());
                payload.extend_from_slice(&code.to_le_bytes());
                payload.extend_from_slice(message.as_bytes());
                encode_frame(OP_ERROR, &payload)
            }
        }
    }

    pub fn decode(frame: &Frame) -> Result<Self> {
        let mut payload = frame.payload.as_slice();
        match frame.opcode {
            OP_EMPTY => {
                expect_consumed(payload, "Empty")?;
                Ok(Response::Empty)
            }
            OP_SORT_OUTCOME => {
                let nano_seconds = i64::from_le_bytes(take::<NANOS_LEN>(&mut payload)?);
                let count = take_u32(&mut payload)? as usize;
                let values = take_i32s(&mut payload, count)?;
                expect_consumed(payload, "SortOutcome")?;
                Ok(Response::SortOutcome(SortOutcome { values, nano_seconds }))
            }
            OP_ERROR => {
                let code = take_u32(&mut payload)?;
                let message = String::from_utf8_lossy(payload).into_owned();
                Ok(Response::Error { code, message })
            }
            other => Err(AppError::protocol(format!("Unknown response opcode 0x{:02X}", other))),
        }
    }

    /// Turn an error response into an `AppError::Remote`
    pub fn into_result(self) -> Result<Self> {
        match self {
            Response::Error { code, message } => Err(AppError::remote(code, message)),
            other => Ok(other),
        }
    }
}

/// Write one already-encoded frame and flush it
pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame, refusing frames longer than `max_len` before reading the
/// payload
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Frame>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32_le().await? as usize;
    if len < OPCODE_LEN {
        return Err(AppError::protocol("Received empty frame"));
    }
    if len > max_len {
        return Err(AppError::protocol(format!(
            "Message too large: {} bytes exceeds the {} byte inbound limit",
            len, max_len
        )));
    }

    let opcode = reader.read_u8().await?;
    let mut payload = vec![0u8; len - OPCODE_LEN];
    reader.read_exact(&mut payload).await?;
    Ok(Frame { opcode, payload })
}

fn encode_frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
    let len = (OPCODE_LEN + payload.len()) as u32;
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + len as usize);
    frame.extend_from_slice(&len.to_le_bytes());
    frame.push(opcode);
    frame.extend_from_slice(payload);
    frame
}

fn put_i32s(buf: &mut Vec<u8>, values: &[i32]) {
    for value in values {
        buf.extend_from_slice(&value.to_le_bytes());
    }
}

fn take<const N: usize>(buf: &mut &[u8]) -> Result<[u8; N]> {
    if buf.len() < N {
        return Err(AppError::protocol(format!(
            "Truncated payload: needed {} bytes, {} left",
            N,
            buf.len()
        )));
    }
    let (head, rest) = buf.split_at(N);
    let mut out = [0u8; N];
    out.copy_from_slice(head);
    *buf = rest;
    Ok(out)
}

fn take_u32(buf: &mut &[u8]) -> Result<u32> {
    Ok(u32::from_le_bytes(take::<COUNT_LEN>(buf)?))
}

fn take_i32s(buf: &mut &[u8], count: usize) -> Result<Vec<i32>> {
    let needed = count
        .checked_mul(INT_LEN)
        .ok_or_else(|| AppError::protocol("Value count overflows"))?;
    if buf.len() < needed {
        return Err(AppError::protocol(format!(
            "Truncated payload: {} values declared, {} bytes left",
            count,
            buf.len()
        )));
    }
    let (head, rest) = buf.split_at(needed);
    let values = head
        .chunks_exact(INT_LEN)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    *buf = rest;
    Ok(values)
}

fn expect_consumed(buf: &[u8], message: &str) -> Result<()> {
    if buf.is_empty() {
        Ok(())
    } else {
        Err(AppError::protocol(format!("{} frame has {} trailing bytes", message, buf.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    async fn read_back(bytes: Vec<u8>, max_len: usize) -> Result<Frame> {
        let mut cursor = Cursor::new(bytes);
        read_frame(&mut cursor, max_len).await
    }

    #[test]
    fn test_ping_frame_layout() {
        assert_eq!(encode_ping(), vec![1, 0, 0, 0, OP_PING]);
    }

    #[test]
    fn test_sort_request_layout() {
        let frame = encode_sort_request(&[3, -1]).unwrap();
        assert_eq!(
            frame,
            vec![
                13, 0, 0, 0, OP_SORT_INTEGERS,
                2, 0, 0, 0,
                3, 0, 0, 0,
                0xFF, 0xFF, 0xFF, 0xFF,
            ]
        );
    }

    #[tokio::test]
    async fn test_sort_outcome_decodes() {
        let response = Response::SortOutcome(SortOutcome {
            values: vec![i32::MIN, 0, 7, i32::MAX],
            nano_seconds: 1_234_567,
        });
        let frame = read_back(response.encode(), 1024).await.unwrap();
        assert_eq!(frame.opcode, OP_SORT_OUTCOME);
        assert_eq!(Response::decode(&frame).unwrap(), response);
    }

    #[tokio::test]
    async fn test_request_decodes() {
        let frame = read_back(encode_sort_request(&[9, 8, 7]).unwrap(), 1024).await.unwrap();
        assert_eq!(Request::decode(&frame).unwrap(), Request::SortIntegers(vec![9, 8, 7]));

        let frame = read_back(encode_ping(), 1024).await.unwrap();
        assert_eq!(Request::decode(&frame).unwrap(), Request::Ping);
    }

    #[tokio::test]
    async fn test_frame_split_across_reads() {
        let bytes = Response::Empty.encode();
        let (head, tail) = bytes.split_at(2);
        let mut reader = tokio_test::io::Builder::new()
            .read(head)
            .read(tail)
            .build();

        let frame = read_frame(&mut reader, 1024).await.unwrap();
        assert_eq!(frame.opcode, OP_EMPTY);
        assert!(frame.payload.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let response = Response::SortOutcome(SortOutcome {
            values: vec![0; 100],
            nano_seconds: 0,
        });
        let err = read_back(response.encode(), 64).await.unwrap_err();
        assert!(matches!(err, AppError::Protocol(ref msg) if msg.contains("Message too large")));
    }

    #[tokio::test]
    async fn test_short_read_is_connectivity_failure() {
        let mut bytes = encode_sort_request(&[1, 2, 3]).unwrap();
        bytes.truncate(bytes.len() - 2);
        let err = read_back(bytes, 1024).await.unwrap_err();
        assert!(matches!(err, AppError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_zero_length_frame_rejected() {
        let err = read_back(vec![0, 0, 0, 0], 1024).await.unwrap_err();
        assert!(matches!(err, AppError::Protocol(_)));
    }

    #[test]
    fn test_declared_count_beyond_payload_rejected() {
        let frame = Frame {
            opcode: OP_SORT_OUTCOME,
            payload: {
                let mut p = 0i64.to_le_bytes().to_vec();
                p.extend_from_slice(&10u32.to_le_bytes());
                p.extend_from_slice(&1i32.to_le_bytes());
                p
            },
        };
        assert!(matches!(Response::decode(&frame), Err(AppError::Protocol(_))));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let frame = Frame { opcode: OP_EMPTY, payload: vec![0] };
        assert!(Response::decode(&frame).is_err());
    }

    #[test]
    fn test_error_response_becomes_remote_error() {
        let response = Response::Error { code: 3, message: "invalid batch".to_string() };
        let frame = Frame { opcode: OP_ERROR, payload: response.encode()[5..].to_vec() };
        let decoded = Response::decode(&frame).unwrap();

        match decoded.into_result() {
            Err(AppError::Remote { code, message }) => {
                assert_eq!(code, 3);
                assert_eq!(message, "invalid batch");
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_opcode_rejected() {
        let frame = Frame { opcode: 0x42, payload: Vec::new() };
        assert!(Response::decode(&frame).is_err());
        assert!(Request::decode(&frame).is_err());
    }

    #[test]
    fn test_wire_len() {
        let frame = Frame { opcode: OP_EMPTY, payload: vec![1, 2, 3] };
        assert_eq!(frame.wire_len(), 8);
    }
}
