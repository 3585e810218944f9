//! Activity construction from player state
//!
//! Turns one player's metadata, position and playback state into the
//! activity payload: a budgeted details line, a state line, optional
//! elapsed/remaining timestamps and the icon assets.

use std::collections::HashMap;

use mpris_discovery::TrackMetadata;
use presence_model::{
    format_budgeted, format_timestamp, Activity, Assets, PlaybackState, Timestamps,
};

use crate::config::ShowTime;

/// Character budget the display imposes on the details field.
const DETAILS_MAX_CHARS: usize = 128;

/// Player identity → registered asset icon key.
const PLAYER_ICONS: [(&str, &str); 8] = [
    ("Clementine", "clementine"),
    ("Media Player Classic Qute Theater", "mpc-qt"),
    ("mpv", "mpv"),
    ("Music Player Daemon", "mpd"),
    ("VLC media player", "vlc"),
    ("SMPlayer", "smplayer"),
    ("Lollypop", "lollypop"),
    ("Mozilla Firefox", "firefox"),
];

fn icon_for(identity: &str) -> Option<&'static str> {
    PLAYER_ICONS
        .iter()
        .find(|(name, _)| *name == identity)
        .map(|(_, icon)| *icon)
}

/// Template values for one tick of one player.
pub fn build_replacements(
    identity: &str,
    metadata: &TrackMetadata,
    position: Option<i64>,
    state: PlaybackState,
) -> HashMap<String, String> {
    let mut values = HashMap::new();
    values.insert("title".to_owned(), metadata.title.clone());
    values.insert("xesam_title".to_owned(), metadata.title.clone());
    values.insert("album".to_owned(), metadata.album.clone());
    values.insert("xesam_album".to_owned(), metadata.album.clone());
    values.insert("artist".to_owned(), metadata.artist());
    values.insert("albumartist".to_owned(), metadata.album_artist());
    values.insert(
        "position".to_owned(),
        position.map(format_timestamp).unwrap_or_default(),
    );
    values.insert(
        "length".to_owned(),
        format_timestamp(metadata.length.unwrap_or(0)),
    );
    values.insert("player".to_owned(), identity.to_owned());
    values.insert("state".to_owned(), state.to_string());
    values
}

/// Build the activity for the active player.
///
/// `now_unix` is the wall clock in unix seconds; it is a parameter so the
/// timestamp arithmetic stays deterministic under test.
pub fn build_activity(
    identity: &str,
    metadata: &TrackMetadata,
    position: Option<i64>,
    state: PlaybackState,
    show_time: ShowTime,
    now_unix: i64,
) -> Activity {
    let values = build_replacements(identity, metadata, position, state);

    let details_template = if values["artist"].is_empty() {
        "{title}"
    } else {
        "{title}\nby {artist}"
    };
    let details = format_budgeted(details_template, &values, DETAILS_MAX_CHARS);

    let state_template = match state {
        PlaybackState::Playing => "{state} [{length}]",
        PlaybackState::Paused => "{state} [{position}/{length}]",
        PlaybackState::Stopped | PlaybackState::Unknown => "{state}",
    };
    let state_text = format_budgeted(state_template, &values, DETAILS_MAX_CHARS);

    // Timestamps only make sense while actually playing, and only when
    // both ends of the arithmetic are known.
    let timestamps = match (state, metadata.length, position) {
        (PlaybackState::Playing, Some(length), Some(position)) => {
            let start = now_unix - position / 1_000_000;
            Some(match show_time {
                ShowTime::Elapsed => Timestamps {
                    start: Some(start),
                    end: None,
                },
                ShowTime::Remaining => Timestamps {
                    start: None,
                    end: Some(start + length / 1_000_000),
                },
            })
        }
        _ => None,
    };

    let assets = match icon_for(identity) {
        Some(icon) => Assets {
            large_image: Some(icon.to_owned()),
            large_text: Some(identity.to_owned()),
            small_image: Some(state.image_key().to_owned()),
            small_text: Some(state.to_string()),
        },
        None => Assets {
            large_image: Some(state.image_key().to_owned()),
            large_text: Some(format!("{identity} ({state})")),
            small_image: None,
            small_text: None,
        },
    };

    Activity {
        details,
        state: state_text,
        timestamps,
        assets: Some(assets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(title: &str, artists: &[&str], length: Option<i64>) -> TrackMetadata {
        TrackMetadata {
            title: title.to_owned(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            length,
            ..TrackMetadata::default()
        }
    }

    #[test]
    fn test_details_with_artist() {
        let activity = build_activity(
            "mpv",
            &metadata("Song", &["First", "Second"], None),
            None,
            PlaybackState::Playing,
            ShowTime::Elapsed,
            1_000,
        );
        assert_eq!(activity.details, "Song\nby First & Second");
    }

    #[test]
    fn test_details_without_artist() {
        let activity = build_activity(
            "mpv",
            &metadata("Song", &[], None),
            None,
            PlaybackState::Playing,
            ShowTime::Elapsed,
            1_000,
        );
        assert_eq!(activity.details, "Song");
    }

    #[test]
    fn test_details_respect_budget() {
        let long_title = "word ".repeat(60);
        let activity = build_activity(
            "mpv",
            &metadata(&long_title, &["Someone"], None),
            None,
            PlaybackState::Playing,
            ShowTime::Elapsed,
            1_000,
        );
        assert!(activity.details.chars().count() <= 128);
    }

    #[test]
    fn test_state_lines_per_state() {
        let meta = metadata("Song", &[], Some(200_000_000));
        let playing = build_activity(
            "mpv", &meta, Some(30_000_000), PlaybackState::Playing, ShowTime::Elapsed, 1_000,
        );
        assert_eq!(playing.state, "Playing [3:20]");

        let paused = build_activity(
            "mpv", &meta, Some(30_000_000), PlaybackState::Paused, ShowTime::Elapsed, 1_000,
        );
        assert_eq!(paused.state, "Paused [0:30/3:20]");

        let stopped = build_activity(
            "mpv", &meta, None, PlaybackState::Stopped, ShowTime::Elapsed, 1_000,
        );
        assert_eq!(stopped.state, "Stopped");
    }

    #[test]
    fn test_timestamps_elapsed() {
        let meta = metadata("Song", &[], Some(200_000_000));
        let activity = build_activity(
            "mpv", &meta, Some(30_000_000), PlaybackState::Playing, ShowTime::Elapsed, 1_000,
        );
        assert_eq!(
            activity.timestamps,
            Some(Timestamps { start: Some(970), end: None })
        );
    }

    #[test]
    fn test_timestamps_remaining() {
        let meta = metadata("Song", &[], Some(200_000_000));
        let activity = build_activity(
            "mpv", &meta, Some(30_000_000), PlaybackState::Playing, ShowTime::Remaining, 1_000,
        );
        assert_eq!(
            activity.timestamps,
            Some(Timestamps { start: None, end: Some(1_170) })
        );
    }

    #[test]
    fn test_no_timestamps_when_paused_or_incomplete() {
        let meta = metadata("Song", &[], Some(200_000_000));
        let paused = build_activity(
            "mpv", &meta, Some(30_000_000), PlaybackState::Paused, ShowTime::Elapsed, 1_000,
        );
        assert_eq!(paused.timestamps, None);

        let no_position = build_activity(
            "mpv", &meta, None, PlaybackState::Playing, ShowTime::Elapsed, 1_000,
        );
        assert_eq!(no_position.timestamps, None);

        let no_length = build_activity(
            "mpv",
            &metadata("Song", &[], None),
            Some(30_000_000),
            PlaybackState::Playing,
            ShowTime::Elapsed,
            1_000,
        );
        assert_eq!(no_length.timestamps, None);
    }

    #[test]
    fn test_known_player_gets_its_icon() {
        let activity = build_activity(
            "VLC media player",
            &metadata("Song", &[], None),
            None,
            PlaybackState::Playing,
            ShowTime::Elapsed,
            1_000,
        );
        let assets = activity.assets.unwrap();
        assert_eq!(assets.large_image.as_deref(), Some("vlc"));
        assert_eq!(assets.large_text.as_deref(), Some("VLC media player"));
        assert_eq!(assets.small_image.as_deref(), Some("playing"));
        assert_eq!(assets.small_text.as_deref(), Some("Playing"));
    }

    #[test]
    fn test_unknown_player_falls_back_to_state_image() {
        let activity = build_activity(
            "Some Obscure Player",
            &metadata("Song", &[], None),
            None,
            PlaybackState::Paused,
            ShowTime::Elapsed,
            1_000,
        );
        let assets = activity.assets.unwrap();
        assert_eq!(assets.large_image.as_deref(), Some("paused"));
        assert_eq!(
            assets.large_text.as_deref(),
            Some("Some Obscure Player (Paused)")
        );
        assert_eq!(assets.small_image, None);
        assert_eq!(assets.small_text, None);
    }
}
