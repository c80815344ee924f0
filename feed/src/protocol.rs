//! Wire protocol: newline-delimited JSON objects, tagged by a `type` field.
//!
//! The client opens with `Hello`, may issue `ActorQuery` and `MapQuery`
//! while the connection is idle, and finally sends `Subscribe` to switch
//! the connection into streaming mode. After that the server pushes `Tick`
//! messages and reads nothing further.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

use crate::error::FeedError;
use crate::types::{ActorState, Waypoint};

/// Client-to-server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedRequest {
    /// Opens the session. Answered with `Welcome`.
    Hello,
    /// Requests a full actor snapshot.
    ActorQuery,
    /// Requests the road network sampled every `spacing` meters.
    MapQuery { spacing: f64 },
    /// Switches the connection to streaming mode.
    Subscribe,
}

/// Server-to-client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedResponse {
    Welcome {
        /// Server software version, informational only.
        version: String,
        /// Name of the loaded map.
        map_name: String,
    },
    ActorList {
        actors: Vec<ActorState>,
    },
    MapData {
        waypoints: Vec<Waypoint>,
    },
    Tick {
        frame: u64,
        elapsed_seconds: f64,
        actors: Vec<ActorState>,
    },
    Error {
        message: String,
    },
}

/// Serialize a request and write it as a single line.
pub fn write_request(writer: &mut impl Write, request: &FeedRequest) -> Result<(), FeedError> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read one line and parse it as a response. A clean EOF maps to
/// [`FeedError::Disconnected`].
pub fn read_response(reader: &mut impl BufRead) -> Result<FeedResponse, FeedError> {
    let mut line = String::new();
    let read = reader.read_line(&mut line)?;
    if read == 0 {
        return Err(FeedError::Disconnected);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}
