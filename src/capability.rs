use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A resource a query can require a shader to use.
///
/// Every capability is checked two ways: membership in the
/// `requires_<name>.txt` association files, and presence of its
/// [`inferred_tag`](Capability::inferred_tag) in the document's
/// `info.requires` list.
///
/// The filter name and the stored tag do not always agree. Most notably
/// [`Capability::Common`] checks for `library`, because a `common` render
/// pass is recorded as `library` when requirements are inferred. This is
/// intended; do not "fix" it to look for `commonbuf`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Buffer,
    Cubemap,
    Image,
    Imagebuf,
    Keyboard,
    Library,
    Mic,
    Music,
    Musicstream,
    Sound,
    Soundbuf,
    Texture,
    Video,
    Volume,
    Webcam,
    Common,
}

impl Capability {
    pub const ALL: [Capability; 16] = [
        Capability::Buffer,
        Capability::Cubemap,
        Capability::Image,
        Capability::Imagebuf,
        Capability::Keyboard,
        Capability::Library,
        Capability::Mic,
        Capability::Music,
        Capability::Musicstream,
        Capability::Sound,
        Capability::Soundbuf,
        Capability::Texture,
        Capability::Video,
        Capability::Volume,
        Capability::Webcam,
        Capability::Common,
    ];

    /// Name used in `requires_<name>.txt` and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Capability::Buffer => "buffer",
            Capability::Cubemap => "cubemap",
            Capability::Image => "image",
            Capability::Imagebuf => "imagebuf",
            Capability::Keyboard => "keyboard",
            Capability::Library => "library",
            Capability::Mic => "mic",
            Capability::Music => "music",
            Capability::Musicstream => "musicstream",
            Capability::Sound => "sound",
            Capability::Soundbuf => "soundbuf",
            Capability::Texture => "texture",
            Capability::Video => "video",
            Capability::Volume => "volume",
            Capability::Webcam => "webcam",
            Capability::Common => "common",
        }
    }

    /// Tag the requirement inferencer writes into `info.requires` for
    /// shaders using this resource.
    pub fn inferred_tag(self) -> &'static str {
        match self {
            Capability::Buffer | Capability::Image | Capability::Imagebuf => {
                "imagebuf"
            }
            Capability::Cubemap => "cubemap",
            Capability::Keyboard => "keyboardbuf",
            Capability::Library | Capability::Common => "library",
            Capability::Mic => "micbuf",
            Capability::Music => "musicbuf",
            Capability::Musicstream => "musicstreambuf",
            Capability::Sound | Capability::Soundbuf => "soundbuf",
            Capability::Texture => "texturebuf",
            Capability::Video => "videobuf",
            Capability::Volume => "volumebuf",
            Capability::Webcam => "webcambuf",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Capability::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::NotFound {
                kind: "capability",
                name: wanted.to_string(),
            })
    }
}
