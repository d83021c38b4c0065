//! # Firmware Events
//!
//! Topics and payload types posted by the firmware's own producers.
//! Scripts are free to use any other topic; these are the ones native code
//! emits.

use serde::{Deserialize, Serialize};

/// Topic names, in `module/event` form.
pub mod topics {
    // =========================================================================
    // MESH
    // =========================================================================
    /// A node advert was heard. Table payload, see [`NodeDiscovered`](super::NodeDiscovered).
    pub const MESH_NODE_DISCOVERED: &str = "mesh/node_discovered";
    /// A group channel packet arrived. Table payload, see [`GroupPacket`](super::GroupPacket).
    pub const MESH_GROUP_PACKET: &str = "mesh/group_packet";
    /// Any packet arrived. Table payload, see [`MeshPacket`](super::MeshPacket).
    pub const MESH_PACKET: &str = "mesh/packet";

    // =========================================================================
    // UI
    // =========================================================================
    pub const SCREEN_PUSHED: &str = "screen/pushed";
    pub const SCREEN_POPPED: &str = "screen/popped";
    /// Payload is `"old_title>new_title"`.
    pub const SCREEN_REPLACED: &str = "screen/replaced";
    /// Payload is `"name=value"`.
    pub const SETTINGS_CHANGED: &str = "settings/changed";
    pub const THEME_WALLPAPER: &str = "theme/wallpaper";
    pub const THEME_ICONS: &str = "theme/icons";
    pub const THEME_COLORS: &str = "theme/colors";

    // =========================================================================
    // BUS
    // =========================================================================
    /// Handled by the built-in echo subscriber.
    pub const BUS_PING: &str = "bus/ping";
    /// Carries the text of each `bus/ping`.
    pub const BUS_ECHO: &str = "bus/echo";
}

/// A mesh node was discovered or refreshed its advert.
///
/// Posted as a record; the optional fields are left out of the table when
/// absent. `age_seconds` is the age when posted and is advanced to the
/// delivery time when the table is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDiscovered {
    pub path_hash: u8,
    pub name: String,
    pub rssi: f32,
    pub snr: f32,
    pub role: u8,
    pub advert_timestamp: u32,
    pub age_seconds: u32,
    pub last_seen: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_key_hex: Option<String>,
    pub has_location: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl NodeDiscovered {
    /// Set the location, keeping `has_location` in step.
    #[must_use]
    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.has_location = true;
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }
}

/// A raw group channel packet. `data` is still encrypted.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPacket {
    pub channel_hash: u8,
    pub data: Vec<u8>,
    pub sender_hash: u8,
    pub rssi: f32,
    pub snr: f32,
}

/// A parsed mesh packet of any type.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPacket {
    pub route_type: u8,
    pub payload_type: u8,
    pub version: u8,
    pub path: Vec<u8>,
    pub payload: Vec<u8>,
    pub rssi: f32,
    pub snr: f32,
    pub timestamp: u32,
}

/// Text notifications from the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ScreenPushed { title: String },
    ScreenPopped { title: String },
    ScreenReplaced { old_title: String, new_title: String },
    SettingChanged { name: String, value: String },
    WallpaperChanged { name: String },
    IconsChanged { name: String },
    ColorsChanged { name: String },
}

impl UiEvent {
    /// The topic this event is posted on.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::ScreenPushed { .. } => topics::SCREEN_PUSHED,
            Self::ScreenPopped { .. } => topics::SCREEN_POPPED,
            Self::ScreenReplaced { .. } => topics::SCREEN_REPLACED,
            Self::SettingChanged { .. } => topics::SETTINGS_CHANGED,
            Self::WallpaperChanged { .. } => topics::THEME_WALLPAPER,
            Self::IconsChanged { .. } => topics::THEME_ICONS,
            Self::ColorsChanged { .. } => topics::THEME_COLORS,
        }
    }

    /// The text payload.
    #[must_use]
    pub fn payload(&self) -> String {
        match self {
            Self::ScreenPushed { title } | Self::ScreenPopped { title } => title.clone(),
            Self::ScreenReplaced {
                old_title,
                new_title,
            } => format!("{old_title}>{new_title}"),
            Self::SettingChanged { name, value } => format!("{name}={value}"),
            Self::WallpaperChanged { name }
            | Self::IconsChanged { name }
            | Self::ColorsChanged { name } => name.clone(),
        }
    }
}
