//! Error type shared by the planner.
//!
//! Everything listed here is fatal for the current optimisation run. Expected
//! infeasibility (an insertion that breaks a time window, a heuristic that
//! finds nothing to improve) is expressed with `Option` / `bool` instead.

use std::fmt;

use crate::model::RoutePointIndex;

#[derive(Debug)]
pub enum Error {
    /// A delivery index appeared in more than one route after a commit.
    DuplicateDelivery(RoutePointIndex),
    /// A driver's required start sequence names a site that does not exist.
    UnresolvedStartSequence { driver: String, site: String },
    /// The distance graph walker could not make progress or produced a
    /// step that is not an edge of the graph.
    MalformedGraph(String),
    /// An over-budget route has no stop left that may be removed.
    UnrepairableRoute(usize),
    /// Skipped points may only be collected once per run.
    SkippedPointsAlreadyCollected,
    /// A point index that is not part of the context's node space.
    UnknownPoint(RoutePointIndex),
    /// Input records are inconsistent.
    InvalidParameters(String),
    /// The directions provider failed a whole request.
    Directions(String),
    Http(reqwest::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateDelivery(index) => {
                write!(f, "delivery {} is assigned to more than one route", index)
            }
            Error::UnresolvedStartSequence { driver, site } => write!(
                f,
                "required start sequence of driver {} references unknown site {}",
                driver, site
            ),
            Error::MalformedGraph(reason) => write!(f, "malformed distance graph: {}", reason),
            Error::UnrepairableRoute(vehicle) => write!(
                f,
                "route of vehicle {} exceeds its limits and has no removable stop",
                vehicle
            ),
            Error::SkippedPointsAlreadyCollected => {
                write!(f, "skipped points were already collected for this run")
            }
            Error::UnknownPoint(index) => write!(f, "unknown route point {}", index),
            Error::InvalidParameters(reason) => write!(f, "invalid parameters: {}", reason),
            Error::Directions(reason) => write!(f, "directions request failed: {}", reason),
            Error::Http(err) => write!(f, "http error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
