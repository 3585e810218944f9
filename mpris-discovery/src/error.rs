//! Error types for MPRIS discovery

use thiserror::Error;

/// Errors raised while talking to players on the session bus.
///
/// The first three kinds are the expected conditions callers branch on;
/// everything else stays a [`MprisError::Bus`] and is treated as
/// unrecoverable by the sync loop.
#[derive(Debug, Error)]
pub enum MprisError {
    /// The player's bus name is gone (service exited mid-operation)
    #[error("player service unknown: {0}")]
    ServiceUnknown(String),

    /// The object does not implement the requested interface or property
    #[error("unsupported interface: {0}")]
    UnsupportedInterface(String),

    /// The player advertises none of the required properties
    #[error("player {0} does not advertise required properties")]
    MissingProperties(String),

    /// Any other bus-level failure
    #[error("bus error: {0}")]
    Bus(#[from] zbus::Error),
}

impl MprisError {
    /// Classify a raw bus error into a distinguishable kind.
    pub fn classify(err: zbus::Error) -> Self {
        match &err {
            zbus::Error::FDO(fdo) => match &**fdo {
                zbus::fdo::Error::ServiceUnknown(msg) => MprisError::ServiceUnknown(msg.clone()),
                zbus::fdo::Error::UnknownInterface(msg)
                | zbus::fdo::Error::UnknownMethod(msg)
                | zbus::fdo::Error::UnknownObject(msg)
                | zbus::fdo::Error::UnknownProperty(msg) => {
                    MprisError::UnsupportedInterface(msg.clone())
                }
                _ => MprisError::Bus(err),
            },
            zbus::Error::MethodError(name, detail, _) => match name.as_str() {
                "org.freedesktop.DBus.Error.ServiceUnknown" => {
                    MprisError::ServiceUnknown(detail.clone().unwrap_or_default())
                }
                "org.freedesktop.DBus.Error.UnknownInterface"
                | "org.freedesktop.DBus.Error.UnknownMethod"
                | "org.freedesktop.DBus.Error.UnknownObject"
                | "org.freedesktop.DBus.Error.UnknownProperty" => {
                    MprisError::UnsupportedInterface(detail.clone().unwrap_or_default())
                }
                _ => MprisError::Bus(err),
            },
            _ => MprisError::Bus(err),
        }
    }

    /// True when the player's service vanished mid-operation.
    pub fn is_service_unknown(&self) -> bool {
        matches!(self, MprisError::ServiceUnknown(_))
    }
}
