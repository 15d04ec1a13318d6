//! Capability tokens reported by the daemon's `GetCapabilities`.

use std::collections::BTreeSet;

use serde::Serialize;

pub const CAP_ACTIONS: &str = "actions";
pub const CAP_BODY: &str = "body";
pub const CAP_BODY_HYPERLINKS: &str = "body-hyperlinks";
pub const CAP_BODY_IMAGES: &str = "body-images";
pub const CAP_BODY_MARKUP: &str = "body-markup";
pub const CAP_ICON_STATIC: &str = "icon-static";
pub const CAP_PERSISTENCE: &str = "persistence";
pub const CAP_SOUND: &str = "sound";

/// Immutable set of capability tokens. Empty when the query failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeSet<String>);

impl Capabilities {
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn supports_actions(&self) -> bool {
        self.contains(CAP_ACTIONS)
    }

    pub fn supports_body(&self) -> bool {
        self.contains(CAP_BODY)
    }

    pub fn supports_body_hyperlinks(&self) -> bool {
        self.contains(CAP_BODY_HYPERLINKS)
    }

    pub fn supports_body_images(&self) -> bool {
        self.contains(CAP_BODY_IMAGES)
    }

    pub fn supports_body_markup(&self) -> bool {
        self.contains(CAP_BODY_MARKUP)
    }

    pub fn supports_icon_static(&self) -> bool {
        self.contains(CAP_ICON_STATIC)
    }

    pub fn supports_persistence(&self) -> bool {
        self.contains(CAP_PERSISTENCE)
    }

    pub fn supports_sound(&self) -> bool {
        self.contains(CAP_SOUND)
    }
}

impl<S: Into<String>> FromIterator<S> for Capabilities {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for Capabilities {
    fn from(tokens: Vec<String>) -> Self {
        tokens.into_iter().collect()
    }
}
