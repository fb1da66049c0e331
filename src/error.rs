use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// Every failure the aggregation pass can meet. None of them are fatal: each one
/// is turned into [`Feed::Unavailable`] at the boundary of the component that saw it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("{source_name} unavailable: {reason}")]
    NetworkUnavailable {
        source_name: String,
        reason: String,
    },
    #[error("{source_name} returned an unexpected payload: {reason}")]
    MalformedResponse {
        source_name: String,
        reason: String,
    },
    #[error("{0} returned no data")]
    NoDataFound(String),
    #[error("no location available after retries and no cached fix")]
    LocationUnresolvable,
}

impl FeedError {
    pub fn network(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::NetworkUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedResponse {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn no_data(source_name: impl Into<String>) -> Self {
        Self::NoDataFound(source_name.into())
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NetworkUnavailable { .. } => "network_unavailable",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::NoDataFound(_) => "no_data_found",
            Self::LocationUnresolvable => "location_unresolvable",
        }
    }
}

/// Outcome of one upstream feed within a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Feed<T> {
    Available(T),
    Unavailable(FeedError),
}

impl<T> Feed<T> {
    pub fn into_available(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FeedError> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable(err) => Some(err),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// A section handed to the renderer: the feed outcome plus the text to show
/// in place of the section when it is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<T> {
    pub feed: Feed<T>,
    pub placeholder: &'static str,
}

impl<T> Section<T> {
    pub fn new(feed: Feed<T>, placeholder: &'static str) -> Self {
        Self { feed, placeholder }
    }
}

impl<T: Serialize> Serialize for Section<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.feed {
            Feed::Available(data) => {
                let mut state = serializer.serialize_struct("Section", 2)?;
                state.serialize_field("status", "available")?;
                state.serialize_field("data", data)?;
                state.end()
            }
            Feed::Unavailable(err) => {
                let mut state = serializer.serialize_struct("Section", 4)?;
                state.serialize_field("status", "unavailable")?;
                state.serialize_field("kind", err.kind())?;
                state.serialize_field("message", &err.to_string())?;
                state.serialize_field("placeholder", self.placeholder)?;
                state.end()
            }
        }
    }
}
