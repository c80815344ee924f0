use std::fmt;

use crate::transform::WorldPoint;

/// Typed error for viewer setup and rendering.
#[derive(Debug)]
pub enum Error {
    /// The world bounds do not span a positive area on both axes, which
    /// also covers an empty waypoint set.
    DegenerateBounds { min: WorldPoint, max: WorldPoint },
    /// A resolution string was not WIDTHxHEIGHT.
    BadResolution(String),
    /// A font file could not be used.
    Font(String),
    /// The live feed failed during setup.
    Feed(birdview_feed::FeedError),
    /// The presentation backend failed.
    Backend(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DegenerateBounds { min, max } => write!(
                f,
                "degenerate world bounds: min ({}, {}), max ({}, {})",
                min.x, min.y, max.x, max.y
            ),
            Error::BadResolution(res) => {
                write!(f, "invalid resolution {res:?}, expected WIDTHxHEIGHT")
            }
            Error::Font(message) => write!(f, "font error: {message}"),
            Error::Feed(err) => write!(f, "feed error: {err}"),
            Error::Backend(message) => write!(f, "backend error: {message}"),
            Error::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<birdview_feed::FeedError> for Error {
    fn from(err: birdview_feed::FeedError) -> Self {
        Error::Feed(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
