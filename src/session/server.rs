//! Session JSON-RPC 2.0 server: reads requests line by line, writes responses.
//!
//! One request is handled at a time, to completion, before the next line is
//! read; this is the single event loop that owns the chart.
//! Tracing output goes to stderr so it doesn't interfere with the protocol.

use std::io::{self, BufRead, Write};

use tracing::{debug, error, info, warn};

use super::commands::ChartSession;
use super::types::*;

/// Run the session loop over stdin/stdout until stdin closes.
pub fn run(session: &mut ChartSession) {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(stdin.lock(), &mut stdout.lock(), session);
}

/// Run the session loop over arbitrary line-oriented streams.
pub fn run_with(reader: impl BufRead, writer: &mut impl Write, session: &mut ChartSession) {
    info!("session server starting");

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!(request = %trimmed, "received request");

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC request");
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                write_response(writer, &response);
                continue;
            }
        };

        if let Some(response) = handle_request(session, &request) {
            write_response(writer, &response);
        }
    }

    info!("session server shutting down");
}

/// Handle a single request. Requests without an id are notifications and get
/// no response.
fn handle_request(session: &mut ChartSession, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = request.id.clone();
    let is_notification = id.is_none();

    let response = match session.call(&request.method, &request.params) {
        Some(Ok(result)) => JsonRpcResponse::success(id, result),
        Some(Err(e)) => JsonRpcResponse::error(id, e.code, e.message),
        None => {
            warn!(method = %request.method, "unknown method");
            JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )
        }
    };

    if is_notification {
        None
    } else {
        Some(response)
    }
}

/// Write a JSON-RPC response (newline-delimited).
fn write_response(writer: &mut impl Write, response: &JsonRpcResponse) {
    let json = serde_json::to_string(response).unwrap_or_default();
    debug!(response = %json, "sending response");
    let _ = writeln!(writer, "{}", json);
    let _ = writer.flush();
}
