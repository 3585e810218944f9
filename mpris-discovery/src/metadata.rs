//! Typed view over the MPRIS metadata map

use std::collections::HashMap;

use zbus::zvariant::{OwnedValue, Value};

/// The metadata fields the presence display consumes.
///
/// Extraction is lenient: values of the wrong type are treated as absent
/// rather than failing the tick, since players routinely bend the MPRIS
/// spec (single strings where lists belong, floats where integers belong).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    /// xesam:title
    pub title: String,
    /// xesam:album
    pub album: String,
    /// xesam:artist
    pub artists: Vec<String>,
    /// xesam:albumArtist
    pub album_artists: Vec<String>,
    /// mpris:length in microseconds, when advertised
    pub length: Option<i64>,
}

impl TrackMetadata {
    /// Extract the known fields from a raw metadata map.
    pub fn from_raw(raw: &HashMap<String, OwnedValue>) -> Self {
        Self {
            title: string_value(raw.get("xesam:title")),
            album: string_value(raw.get("xesam:album")),
            artists: string_list_value(raw.get("xesam:artist")),
            album_artists: string_list_value(raw.get("xesam:albumArtist")),
            length: int_value(raw.get("mpris:length")),
        }
    }

    /// Artists joined for display.
    pub fn artist(&self) -> String {
        self.artists.join(" & ")
    }

    /// Album artists joined for display.
    pub fn album_artist(&self) -> String {
        self.album_artists.join(" & ")
    }
}

/// Unwrap a variant-in-variant layer, which some players add.
fn inner<'a>(value: &'a Value<'a>) -> &'a Value<'a> {
    match value {
        Value::Value(boxed) => boxed,
        other => other,
    }
}

fn string_value(value: Option<&OwnedValue>) -> String {
    match value.map(|v| inner(v)) {
        Some(Value::Str(s)) => s.as_str().to_owned(),
        _ => String::new(),
    }
}

fn string_list_value(value: Option<&OwnedValue>) -> Vec<String> {
    match value.map(|v| inner(v)) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match inner(item) {
                Value::Str(s) => Some(s.as_str().to_owned()),
                _ => None,
            })
            .collect(),
        // spec-violating players hand over a single string
        Some(Value::Str(s)) => vec![s.as_str().to_owned()],
        _ => Vec::new(),
    }
}

fn int_value(value: Option<&OwnedValue>) -> Option<i64> {
    match value.map(|v| inner(v))? {
        Value::I64(n) => Some(*n),
        Value::U64(n) => Some(*n as i64),
        Value::I32(n) => Some(i64::from(*n)),
        Value::U32(n) => Some(i64::from(*n)),
        // smplayer reports positions/lengths as floats
        Value::F64(n) => Some(*n as i64),
        _ => None,
    }
}
