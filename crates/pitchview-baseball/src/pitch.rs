// Pitch-type codes: display names and plot colors.

use std::fmt;

/// Display name used for any code missing from the pitch table.
pub const UNIDENTIFIED: &str = "Unidentified";

/// Pitch types reported in the Statcast `pitch_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchType {
    FourSeamFastball,
    TwoSeamFastball,
    Cutter,
    /// Legacy `FS` code; Statcast reported sinkers under it before `SI`.
    LegacySinker,
    Sinker,
    Splitter,
    Slider,
    Sweeper,
    Slurve,
    ChangeUp,
    Screwball,
    Curveball,
    /// `CB`, the older curveball code.
    LegacyCurveball,
    KnuckleCurve,
    SlowCurve,
    Knuckleball,
    Eephus,
    Fastball,
    PitchOut,
    /// `FO`, the pitchout code used in some seasons.
    LegacyPitchOut,
    IntentionalBall,
    Unknown,
    Placeholder,
}

/// Plot colors for pitch families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchColor {
    Red,
    Blue,
    Purple,
    Orange,
    Green,
    Black,
}

impl PitchColor {
    /// Lower-case color name.
    pub fn name(&self) -> &'static str {
        match self {
            PitchColor::Red => "red",
            PitchColor::Blue => "blue",
            PitchColor::Purple => "purple",
            PitchColor::Orange => "orange",
            PitchColor::Green => "green",
            PitchColor::Black => "black",
        }
    }
}

impl fmt::Display for PitchColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PitchType {
    pub const ALL: [PitchType; 23] = [
        PitchType::FourSeamFastball,
        PitchType::TwoSeamFastball,
        PitchType::Cutter,
        PitchType::LegacySinker,
        PitchType::Sinker,
        PitchType::Splitter,
        PitchType::Slider,
        PitchType::Sweeper,
        PitchType::Slurve,
        PitchType::ChangeUp,
        PitchType::Screwball,
        PitchType::Curveball,
        PitchType::LegacyCurveball,
        PitchType::KnuckleCurve,
        PitchType::SlowCurve,
        PitchType::Knuckleball,
        PitchType::Eephus,
        PitchType::Fastball,
        PitchType::PitchOut,
        PitchType::LegacyPitchOut,
        PitchType::IntentionalBall,
        PitchType::Unknown,
        PitchType::Placeholder,
    ];

    /// Parse a Statcast pitch-type code. Codes are matched case-insensitively
    /// after trimming; unknown codes return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "FF" => Some(PitchType::FourSeamFastball),
            "FT" => Some(PitchType::TwoSeamFastball),
            "FC" => Some(PitchType::Cutter),
            "FS" => Some(PitchType::LegacySinker),
            "SI" => Some(PitchType::Sinker),
            "SF" => Some(PitchType::Splitter),
            "SL" => Some(PitchType::Slider),
            "ST" => Some(PitchType::Sweeper),
            "SV" => Some(PitchType::Slurve),
            "CH" => Some(PitchType::ChangeUp),
            "SC" => Some(PitchType::Screwball),
            "CU" => Some(PitchType::Curveball),
            "CB" => Some(PitchType::LegacyCurveball),
            "KC" => Some(PitchType::KnuckleCurve),
            "CS" => Some(PitchType::SlowCurve),
            "KN" => Some(PitchType::Knuckleball),
            "EP" => Some(PitchType::Eephus),
            "FA" => Some(PitchType::Fastball),
            "PO" => Some(PitchType::PitchOut),
            "FO" => Some(PitchType::LegacyPitchOut),
            "IN" => Some(PitchType::IntentionalBall),
            "UN" => Some(PitchType::Unknown),
            "XX" => Some(PitchType::Placeholder),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PitchType::FourSeamFastball => "Four-Seam Fastball",
            PitchType::TwoSeamFastball => "Two-Seam Fastball",
            PitchType::Cutter => "Cutter",
            PitchType::LegacySinker | PitchType::Sinker => "Sinker",
            PitchType::Splitter => "Splitter",
            PitchType::Slider => "Slider",
            PitchType::Sweeper => "Sweeper",
            PitchType::Slurve => "Slurve",
            PitchType::ChangeUp => "Change-Up",
            PitchType::Screwball => "Screwball",
            PitchType::Curveball | PitchType::LegacyCurveball => "Curveball",
            PitchType::KnuckleCurve => "Knuckle-Curve",
            PitchType::SlowCurve => "Slow Curve",
            PitchType::Knuckleball => "Knuckler",
            PitchType::Eephus => "Eephus",
            PitchType::Fastball => "Fastball",
            PitchType::PitchOut | PitchType::LegacyPitchOut => "Pitch Out",
            PitchType::IntentionalBall | PitchType::Unknown | PitchType::Placeholder => {
                UNIDENTIFIED
            }
        }
    }

    pub fn color(&self) -> PitchColor {
        match self {
            PitchType::FourSeamFastball
            | PitchType::TwoSeamFastball
            | PitchType::Cutter
            | PitchType::LegacySinker
            | PitchType::Sinker
            | PitchType::Splitter
            | PitchType::Fastball => PitchColor::Red,
            PitchType::ChangeUp | PitchType::Screwball => PitchColor::Blue,
            PitchType::Curveball
            | PitchType::LegacyCurveball
            | PitchType::KnuckleCurve
            | PitchType::SlowCurve
            | PitchType::Slurve => PitchColor::Purple,
            PitchType::Knuckleball => PitchColor::Orange,
            PitchType::Slider | PitchType::Sweeper => PitchColor::Green,
            PitchType::Eephus
            | PitchType::PitchOut
            | PitchType::LegacyPitchOut
            | PitchType::IntentionalBall
            | PitchType::Unknown
            | PitchType::Placeholder => PitchColor::Black,
        }
    }
}

/// Display name for a raw pitch-type code, `"Unidentified"` when unmapped.
pub fn pitch_name(code: &str) -> &'static str {
    PitchType::from_code(code).map_or(UNIDENTIFIED, |p| p.display_name())
}

/// Plot color for a raw pitch-type code, black when unmapped.
pub fn pitch_color(code: &str) -> PitchColor {
    PitchType::from_code(code).map_or(PitchColor::Black, |p| p.color())
}

/// Plot color for a display name, as shown in frequency categories.
pub fn color_for_name(name: &str) -> PitchColor {
    PitchType::ALL
        .iter()
        .find(|p| p.display_name() == name)
        .map_or(PitchColor::Black, |p| p.color())
}
