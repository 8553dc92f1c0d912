//! Error types for the compositing crate.
//!
//! None of these ever escape as a session-level failure: the compositor logs
//! them and settles in either `Inactive` or `Active`. They exist so that each
//! collaborator can say precisely what went wrong.

use novade_core::error::CoreError;
use thiserror::Error;

use crate::display::{DamageHandle, Extension};

/// Failures reported by a [`crate::display::DisplayConnection`].
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Display extension {0:?} is not available")]
    MissingExtension(Extension),

    #[error("Selection {0} is owned by another client")]
    SelectionOwned(String),

    #[error("Unknown damage object {0:?}")]
    UnknownDamage(DamageHandle),
}

/// Failures while constructing a [`crate::scene::Scene`].
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Scene backend '{0}' is not supported")]
    Unsupported(&'static str),

    #[error("Scene initialization failed: {0}")]
    InitFailed(String),
}

#[derive(Error, Debug)]
pub enum CompositingError {
    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Could not claim compositing manager selection {selection}")]
    SelectionClaim {
        selection: String,
        #[source]
        source: DisplayError,
    },

    #[error("Event loop error: {0}")]
    EventLoop(#[from] calloop::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CompositingError> = std::result::Result<T, E>;
