//! Line-oriented host protocol server
//!
//! A host shell (launcher plugin, editor integration, script) starts
//! `fuzzfind serve`, writes one request per keystroke-driven query and reads
//! one response line back. Requests are handled in arrival order; each
//! query gets its own tool lookup, preference resolution and processes.

pub mod protocol;

use crate::deps::ExecutableProbe;
use crate::handler::QueryHandler;
use crate::search::SearchPipeline;
use protocol::{Incoming, Request, Response, read_request, write_message};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

/// Counters reported when the server stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub queries_served: u64,
    pub invalid_requests: u64,
}

/// Serve requests until the host sends `Shutdown` or closes the stream
pub fn serve<P, E, R, W>(
    handler: &QueryHandler<P, E>,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<ServeStats>
where
    P: SearchPipeline,
    E: ExecutableProbe,
    R: BufRead,
    W: Write,
{
    let mut stats = ServeStats::default();
    info!("Serving host requests on stdin");

    loop {
        let response = match read_request(reader)? {
            Incoming::Closed => {
                debug!("Host closed the stream");
                break;
            }
            Incoming::Invalid(message) => {
                warn!(%message, "Rejected request");
                stats.invalid_requests += 1;
                Response::Error { message }
            }
            Incoming::Request(Request::Ping) => Response::Pong,
            Incoming::Request(Request::Shutdown) => {
                write_message(writer, &Response::ShuttingDown)?;
                break;
            }
            Incoming::Request(Request::Query { query, preferences }) => {
                stats.queries_served += 1;
                Response::Items {
                    items: handler.handle(&query, &preferences),
                }
            }
        };

        write_message(writer, &response)?;
    }

    info!(
        queries = stats.queries_served,
        invalid = stats.invalid_requests,
        "Server stopped"
    );
    Ok(stats)
}
