use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Failed to create window {0}")]
    WindowCreation(String),
    #[error("No window matching {0:?} was found")]
    HandleNotFound(String),
    #[error("Window handle {0:#x} is no longer valid")]
    StaleHandle(isize),
    #[error("Failed to apply window style: {0}")]
    StyleApplication(String),
    #[error("Failed to create embedded surface: {0}")]
    SurfaceCreation(String),
    #[error("Embedded surface error: {0}")]
    Surface(String),
    #[error("Overlay session unavailable: {0}")]
    SessionUnavailable(String),
    #[error("Tauri error: {0}")]
    TauriError(#[from] tauri::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Coarse classification used to decide whether an error may end the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    WindowCreation,
    HandleResolution,
    StyleApplication,
    SurfaceCreation,
    Runtime,
}

impl ErrorKind {
    /// Fatal kinds abort startup; everything else is reported and survived.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::Configuration | ErrorKind::WindowCreation)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl { .. } | Error::InvalidGeometry(_) | Error::Configuration(_) => {
                ErrorKind::Configuration
            }
            Error::WindowCreation(_) => ErrorKind::WindowCreation,
            Error::HandleNotFound(_) | Error::StaleHandle(_) => ErrorKind::HandleResolution,
            Error::StyleApplication(_) => ErrorKind::StyleApplication,
            Error::SurfaceCreation(_) | Error::Surface(_) => ErrorKind::SurfaceCreation,
            Error::SessionUnavailable(_) | Error::TauriError(_) | Error::IoError(_) => {
                ErrorKind::Runtime
            }
        }
    }

    /// Process exit status for an error that ended the application.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Configuration => 2,
            ErrorKind::WindowCreation => 3,
            _ => 1,
        }
    }
}
