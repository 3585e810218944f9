//! Rich-presence activity payload model
//!
//! Mirrors the shape the presence client expects in `SET_ACTIVITY`. Absent
//! fields are skipped during serialization so they stay off the wire
//! entirely instead of arriving as `null`.

use serde::Serialize;

/// Unix-second timestamps shown as elapsed/remaining time by the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timestamps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

/// Icon keys and hover texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

/// One activity update, built fresh every tick and diffed against the last
/// value that actually went over the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Activity {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub details: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Timestamps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<Assets>,
}

/// What, if anything, must go over the wire this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceUpdate {
    /// Send this activity and cache it as last-sent
    Set(Activity),
    /// Send an explicit clear and drop the cached value
    Clear,
    /// Nothing changed; skip the send
    Keep,
}

/// Diff the freshly built activity against the last one sent.
///
/// `last_sent` of `None` means nothing is currently displayed (either
/// nothing was ever sent or the presence was cleared). Re-planning the same
/// activity therefore yields `Keep`, and a vanished player yields exactly
/// one `Clear`.
pub fn plan_update(last_sent: Option<&Activity>, current: Option<Activity>) -> PresenceUpdate {
    match current {
        Some(activity) => {
            if last_sent == Some(&activity) {
                PresenceUpdate::Keep
            } else {
                PresenceUpdate::Set(activity)
            }
        }
        None => {
            if last_sent.is_some() {
                PresenceUpdate::Clear
            } else {
                PresenceUpdate::Keep
            }
        }
    }
}
