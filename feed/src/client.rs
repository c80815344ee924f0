//! Blocking TCP client for the simulator feed.
//!
//! [`connect`] performs the handshake and the initial actor query, then
//! hands out a [`WorldHandle`] and a [`MapHandle`] sharing one connection.
//! Registering a tick callback moves the connection into streaming mode;
//! from then on a background thread keeps the actor snapshot fresh.

use std::io::{self, BufReader};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FeedError;
use crate::protocol::{self, FeedRequest, FeedResponse};
use crate::types::{ActorState, TickEvent, Waypoint};

struct Conn {
    writer: TcpStream,
    /// Taken by the reader thread when streaming starts.
    reader: Option<BufReader<TcpStream>>,
}

/// State shared with the reader thread. Deliberately free of any back
/// reference to [`Inner`] so the thread cannot keep the connection alive.
struct Shared {
    actors: Mutex<Vec<ActorState>>,
    shutdown: AtomicBool,
}

struct Inner {
    conn: Mutex<Conn>,
    shared: Arc<Shared>,
    streaming: AtomicBool,
    reader_thread: Mutex<Option<JoinHandle<()>>>,
    addr: String,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        {
            let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
            // Unblocks the reader thread if it is parked in a read
            let _ = conn.writer.shutdown(Shutdown::Both);
        }
        let handle = self
            .reader_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        debug!("closed feed connection to {}", self.addr);
    }
}

/// Live world view: the actor snapshot plus the tick subscription.
pub struct WorldHandle {
    inner: Arc<Inner>,
}

/// Road network queries. Only usable before streaming starts.
pub struct MapHandle {
    inner: Arc<Inner>,
}

/// Open a connection, perform the handshake and fetch the initial actor
/// snapshot. A single attempt; any failure here is fatal to the caller.
pub fn connect(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(WorldHandle, MapHandle, Vec<ActorState>), FeedError> {
    let addr = format!("{host}:{port}");
    let mut resolved = addr
        .to_socket_addrs()
        .map_err(|source| FeedError::Connect { addr: addr.clone(), source })?;
    let sockaddr = resolved.next().ok_or_else(|| FeedError::Connect {
        addr: addr.clone(),
        source: io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing"),
    })?;

    let stream = TcpStream::connect_timeout(&sockaddr, timeout)
        .map_err(|source| FeedError::Connect { addr: addr.clone(), source })?;
    stream.set_read_timeout(Some(timeout))?;
    let reader = BufReader::new(stream.try_clone()?);
    let mut conn = Conn { writer: stream, reader: Some(reader) };

    protocol::write_request(&mut conn.writer, &FeedRequest::Hello)?;
    match read_from(&mut conn)? {
        FeedResponse::Welcome { version, map_name } => {
            debug!("connected to {addr}: server {version}, map {map_name}");
        }
        FeedResponse::Error { message } => return Err(FeedError::Protocol(message)),
        other => return Err(unexpected(&other, "Welcome")),
    }

    protocol::write_request(&mut conn.writer, &FeedRequest::ActorQuery)?;
    let actors = match read_from(&mut conn)? {
        FeedResponse::ActorList { actors } => actors,
        FeedResponse::Error { message } => return Err(FeedError::Protocol(message)),
        other => return Err(unexpected(&other, "ActorList")),
    };
    debug!("initial snapshot holds {} actors", actors.len());

    let shared = Arc::new(Shared {
        actors: Mutex::new(actors.clone()),
        shutdown: AtomicBool::new(false),
    });
    let inner = Arc::new(Inner {
        conn: Mutex::new(conn),
        shared,
        streaming: AtomicBool::new(false),
        reader_thread: Mutex::new(None),
        addr,
    });

    Ok((WorldHandle { inner: inner.clone() }, MapHandle { inner }, actors))
}

impl MapHandle {
    /// Fetch the road network sampled every `spacing` meters.
    pub fn sample_waypoints(&self, spacing: f64) -> Result<Vec<Waypoint>, FeedError> {
        if self.inner.streaming.load(Ordering::SeqCst) {
            return Err(FeedError::Streaming);
        }
        let mut conn = self.inner.conn.lock().unwrap_or_else(PoisonError::into_inner);
        protocol::write_request(&mut conn.writer, &FeedRequest::MapQuery { spacing })?;
        match read_from(&mut conn)? {
            FeedResponse::MapData { waypoints } => {
                debug!("map query returned {} waypoints", waypoints.len());
                Ok(waypoints)
            }
            FeedResponse::Error { message } => Err(FeedError::Protocol(message)),
            other => Err(unexpected(&other, "MapData")),
        }
    }
}

impl WorldHandle {
    /// Latest actor snapshot. Returns a clone; cheap enough to call once
    /// per frame.
    pub fn actors(&self) -> Vec<ActorState> {
        self.inner
            .shared
            .actors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to world ticks. The callback runs on a background thread
    /// after each tick has replaced the snapshot. Only one subscription is
    /// allowed per connection; a failed attempt does not count as one.
    pub fn on_tick<F>(&self, callback: F) -> Result<(), FeedError>
    where
        F: FnMut(TickEvent) + Send + 'static,
    {
        if self.inner.streaming.swap(true, Ordering::SeqCst) {
            return Err(FeedError::AlreadySubscribed);
        }
        let result = self.start_streaming(callback);
        if result.is_err() {
            // Nothing is streaming; queries and a retry stay possible.
            self.inner.streaming.store(false, Ordering::SeqCst);
        }
        result
    }

    fn start_streaming<F>(&self, callback: F) -> Result<(), FeedError>
    where
        F: FnMut(TickEvent) + Send + 'static,
    {
        let mut conn = self.inner.conn.lock().unwrap_or_else(PoisonError::into_inner);
        protocol::write_request(&mut conn.writer, &FeedRequest::Subscribe)?;
        let reader = conn.reader.take().ok_or(FeedError::AlreadySubscribed)?;
        // Ticks arrive at the server's own rate, no read deadline from here on
        if let Err(err) = reader.get_ref().set_read_timeout(None) {
            conn.reader = Some(reader);
            return Err(err.into());
        }

        let shared = self.inner.shared.clone();
        let handle = thread::Builder::new()
            .name("feed-reader".to_string())
            .spawn(move || stream_loop(reader, shared, callback))?;
        *self
            .inner
            .reader_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }
}

fn stream_loop<F>(mut reader: BufReader<TcpStream>, shared: Arc<Shared>, mut callback: F)
where
    F: FnMut(TickEvent),
{
    let mut last_elapsed: Option<f64> = None;
    loop {
        match protocol::read_response(&mut reader) {
            Ok(FeedResponse::Tick { frame, elapsed_seconds, actors }) => {
                *shared.actors.lock().unwrap_or_else(PoisonError::into_inner) = actors;
                let delta_seconds = last_elapsed
                    .map(|previous| elapsed_seconds - previous)
                    .unwrap_or(0.0);
                last_elapsed = Some(elapsed_seconds);
                callback(TickEvent { frame, elapsed_seconds, delta_seconds });
            }
            Ok(other) => warn!("ignoring non-tick message in stream: {}", kind(&other)),
            Err(_) if shared.shutdown.load(Ordering::SeqCst) => break,
            Err(FeedError::Disconnected) => {
                warn!("feed stream closed by the server");
                break;
            }
            Err(err) => {
                warn!("feed stream error: {err}");
                break;
            }
        }
    }
    debug!("feed reader thread exiting");
}

fn read_from(conn: &mut Conn) -> Result<FeedResponse, FeedError> {
    let reader = conn.reader.as_mut().ok_or(FeedError::Streaming)?;
    protocol::read_response(reader).map_err(map_timeout)
}

/// Read timeouts on the blocking request path surface as `WouldBlock` or
/// `TimedOut` depending on the platform.
fn map_timeout(err: FeedError) -> FeedError {
    match err {
        FeedError::Io(ref io)
            if matches!(io.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
        {
            FeedError::Timeout
        }
        other => other,
    }
}

fn kind(response: &FeedResponse) -> &'static str {
    match response {
        FeedResponse::Welcome { .. } => "Welcome",
        FeedResponse::ActorList { .. } => "ActorList",
        FeedResponse::MapData { .. } => "MapData",
        FeedResponse::Tick { .. } => "Tick",
        FeedResponse::Error { .. } => "Error",
    }
}

fn unexpected(response: &FeedResponse, expected: &str) -> FeedError {
    FeedError::Protocol(format!("expected {expected}, got {}", kind(response)))
}
