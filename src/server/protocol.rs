//! Protocol messages between a host shell and `fuzzfind serve`
//!
//! Newline-delimited JSON: one request object per line in, one response
//! object per line out.

use crate::output::DisplayItem;
use crate::prefs::RawPreferences;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Read, Write};

/// Longest request line accepted
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Request from host to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Run one query with the host's current raw preferences
    Query {
        query: String,
        #[serde(default)]
        preferences: RawPreferences,
    },

    /// Ping for connection testing
    Ping,

    /// Graceful shutdown request
    Shutdown,
}

/// Response from server to host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Items to render for a query
    Items { items: Vec<DisplayItem> },

    /// Pong response
    Pong,

    /// Shutdown acknowledged
    ShuttingDown,

    /// The request line could not be understood
    Error { message: String },
}

/// Write one message as a single JSON line
pub fn write_message<W: Write>(writer: &mut W, msg: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, msg)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Outcome of reading one request line
#[derive(Debug)]
pub enum Incoming {
    Request(Request),
    /// A line arrived but was not a valid request
    Invalid(String),
    /// The host closed the stream
    Closed,
}

/// Read the next non-blank line and decode it as a request.
///
/// Lines that are oversized, not UTF-8 or not a request come back as
/// [`Incoming::Invalid`]; only I/O failures are errors.
pub fn read_request<R: BufRead>(reader: &mut R) -> io::Result<Incoming> {
    read_request_within(reader, MAX_LINE_BYTES)
}

fn read_request_within<R: BufRead>(reader: &mut R, max_len: usize) -> io::Result<Incoming> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .by_ref()
            .take(max_len as u64 + 1)
            .read_until(b'\n', &mut line)?;
        if read == 0 {
            return Ok(Incoming::Closed);
        }

        if line.len() > max_len && line.last() != Some(&b'\n') {
            discard_rest_of_line(reader)?;
            return Ok(Incoming::Invalid("Request too large".to_string()));
        }
        if !line.trim_ascii().is_empty() {
            break;
        }
    }

    let text = match std::str::from_utf8(&line) {
        Ok(text) => text,
        Err(e) => return Ok(Incoming::Invalid(format!("Request is not UTF-8: {e}"))),
    };

    match serde_json::from_str(text.trim_end()) {
        Ok(request) => Ok(Incoming::Request(request)),
        Err(e) => Ok(Incoming::Invalid(format!("Invalid request: {e}"))),
    }
}

/// Skip input up to and including the next newline without buffering it
fn discard_rest_of_line<R: BufRead>(reader: &mut R) -> io::Result<()> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}
