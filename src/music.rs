//! Musical value types carried by the project-info record.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! music_keys {
    ($($variant:ident => ($name:literal, $tonic:literal, $minor:literal)),+ $(,)?) => {
        /// A musical key.
        ///
        /// Declaration order is the legacy index order used by older file
        /// versions; [`MusicKey::uuid`] is that index plus one.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum MusicKey {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl MusicKey {
            /// Every key in legacy index order.
            pub const ALL: [MusicKey; 30] = [$(MusicKey::$variant),+];

            /// Display name, e.g. `"C♯ Major"`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(MusicKey::$variant => $name,)+
                }
            }

            /// Semitones from C to the tonic.
            pub const fn tonic_offset(self) -> u8 {
                match self {
                    $(MusicKey::$variant => $tonic,)+
                }
            }

            /// Whether the key is minor.
            pub const fn is_minor(self) -> bool {
                match self {
                    $(MusicKey::$variant => $minor,)+
                }
            }
        }
    };
}

music_keys! {
    CMajor => ("C Major", 0, false),
    CSharpMajor => ("C♯ Major", 1, false),
    DFlatMajor => ("D♭ Major", 1, false),
    DMajor => ("D Major", 2, false),
    EFlatMajor => ("E♭ Major", 3, false),
    EMajor => ("E Major", 4, false),
    FMajor => ("F Major", 5, false),
    FSharpMajor => ("F♯ Major", 6, false),
    GFlatMajor => ("G♭ Major", 6, false),
    GMajor => ("G Major", 7, false),
    AFlatMajor => ("A♭ Major", 8, false),
    AMajor => ("A Major", 9, false),
    BFlatMajor => ("B♭ Major", 10, false),
    BMajor => ("B Major", 11, false),
    CFlatMajor => ("C♭ Major", 11, false),
    CMinor => ("C Minor", 0, true),
    CSharpMinor => ("C♯ Minor", 1, true),
    DMinor => ("D Minor", 2, true),
    DSharpMinor => ("D♯ Minor", 3, true),
    EFlatMinor => ("E♭ Minor", 3, true),
    EMinor => ("E Minor", 4, true),
    FMinor => ("F Minor", 5, true),
    FSharpMinor => ("F♯ Minor", 6, true),
    GMinor => ("G Minor", 7, true),
    GSharpMinor => ("G♯ Minor", 8, true),
    AFlatMinor => ("A♭ Minor", 8, true),
    AMinor => ("A Minor", 9, true),
    ASharpMinor => ("A♯ Minor", 10, true),
    BFlatMinor => ("B♭ Minor", 10, true),
    BMinor => ("B Minor", 11, true),
}

impl MusicKey {
    /// Position in [`MusicKey::ALL`], as stored by versions before `0x000B0003`.
    pub fn legacy_index(self) -> usize {
        // ALL lists every variant, so the search always succeeds.
        Self::ALL.iter().position(|k| *k == self).unwrap_or_default()
    }

    /// Looks a key up by its legacy index.
    pub fn from_legacy_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable identifier stored by `0x000B0003` and later (`1..=30`).
    pub fn uuid(self) -> i16 {
        self.legacy_index() as i16 + 1
    }

    /// Looks a key up by its stable identifier.
    pub fn from_uuid(uuid: i16) -> Option<Self> {
        usize::try_from(uuid)
            .ok()
            .and_then(|u| u.checked_sub(1))
            .and_then(Self::from_legacy_index)
    }

    /// Looks a key up by display name. `#` and `b` are accepted for `♯` and `♭`.
    pub fn from_name(name: &str) -> Option<Self> {
        let fancy = name.trim().replace('#', "♯");
        Self::ALL.into_iter().find(|k| {
            let canonical = k.name();
            canonical.eq_ignore_ascii_case(&fancy)
                || canonical.replace('♭', "b").eq_ignore_ascii_case(&fancy)
        })
    }
}

impl Default for MusicKey {
    fn default() -> Self {
        Self::CMajor
    }
}

impl fmt::Display for MusicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A time signature such as 6/8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Beats per bar (the numerator).
    pub beats_per_bar: u16,
    /// Note value that gets one beat (the denominator).
    pub beat_unit: u16,
}

impl TimeSignature {
    /// 4/4.
    pub const FOUR_FOUR: Self = Self::new(4, 4);
    /// 2/2.
    pub const TWO_TWO: Self = Self::new(2, 2);
    /// 2/4.
    pub const TWO_FOUR: Self = Self::new(2, 4);
    /// 3/4.
    pub const THREE_FOUR: Self = Self::new(3, 4);
    /// 3/8.
    pub const THREE_EIGHT: Self = Self::new(3, 8);
    /// 6/8.
    pub const SIX_EIGHT: Self = Self::new(6, 8);
    /// 9/8.
    pub const NINE_EIGHT: Self = Self::new(9, 8);
    /// 12/8.
    pub const TWELVE_EIGHT: Self = Self::new(12, 8);

    /// The signatures older versions could store, in index order.
    pub const LEGACY: [Self; 8] = [
        Self::FOUR_FOUR,
        Self::TWO_TWO,
        Self::TWO_FOUR,
        Self::THREE_FOUR,
        Self::THREE_EIGHT,
        Self::SIX_EIGHT,
        Self::NINE_EIGHT,
        Self::TWELVE_EIGHT,
    ];

    /// Creates a time signature.
    pub const fn new(beats_per_bar: u16, beat_unit: u16) -> Self {
        Self {
            beats_per_bar,
            beat_unit,
        }
    }

    /// Index in [`TimeSignature::LEGACY`], if the signature is listed there.
    pub fn legacy_index(self) -> Option<usize> {
        Self::LEGACY.iter().position(|t| *t == self)
    }

    /// Looks up a legacy index.
    pub fn from_legacy_index(index: usize) -> Option<Self> {
        Self::LEGACY.get(index).copied()
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_bar, self.beat_unit)
    }
}
