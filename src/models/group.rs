// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group (color-tagged label) model.

use serde::{Deserialize, Serialize};

/// Colors offered when creating a group.
pub const PALETTE: [&str; 10] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#FFA500", "#FF69B4", "#A52A2A",
    "#808080", "#00FFFF",
];

/// Groups created for a user who has none yet: (name, color).
pub const DEFAULT_GROUPS: [(&str, &str); 3] = [
    ("Gia đình", "#FF0000"),
    ("Công việc", "#0000FF"),
    ("Bạn bè", "#00FF00"),
];

/// Group stored in Firestore under `users/{email}/groups/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Group {
    /// Document ID; absent from documents written by the mobile client
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
}

/// Palette colors not yet used by any of `groups`.
///
/// Comparison is case-insensitive so hand-entered lowercase colors still
/// hide their palette entry.
pub fn available_colors(groups: &[Group]) -> Vec<&'static str> {
    PALETTE
        .iter()
        .copied()
        .filter(|color| !groups.iter().any(|g| g.color.eq_ignore_ascii_case(color)))
        .collect()
}

/// Check for a `#RRGGBB` color string.
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
