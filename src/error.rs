//! Error types shared by the loader, the resource manager and the frame renderer.

use std::path::PathBuf;

/// Everything that can go wrong while starting or running a walkthrough.
///
/// Startup failures (`ResourceCreationFailed`, `MalformedWorldFile`, `Io`) are
/// fatal: [`Engine::init`](crate::Engine::init) returns them and no session is
/// started. `SwapchainUnavailable` and `DepthTargetStale` are transient and are
/// absorbed by [`Engine::render_frame`](crate::Engine::render_frame).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create {resource}: {reason}")]
    ResourceCreationFailed {
        resource: &'static str,
        reason: String,
    },

    #[error("malformed world file (line {line}): {reason}")]
    MalformedWorldFile { line: usize, reason: String },

    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no presentable frame is available")]
    SwapchainUnavailable,

    #[error("depth target is {actual:?} but the frame is {expected:?}")]
    DepthTargetStale {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("render backend failure: {0}")]
    Backend(String),
}

impl Error {
    pub(crate) fn resource(resource: &'static str, reason: impl ToString) -> Self {
        Error::ResourceCreationFailed {
            resource,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedWorldFile {
            line,
            reason: reason.into(),
        }
    }

    /// True for the conditions a frame loop should ride out rather than abort on.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::SwapchainUnavailable | Error::DepthTargetStale { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
