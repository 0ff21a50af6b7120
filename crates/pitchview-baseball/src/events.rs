// Play-outcome formatting.
//
// Statcast reports two outcome columns per pitch: `description` (what the
// pitch did: ball, foul, hit_into_play, ...) and `events` (what the plate
// appearance ended in, only set on its final pitch). The dashboard shows the
// event for balls put in play and the pitch result otherwise.

/// Outcome of a plate appearance that ended with a ball in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayEvent {
    Single,
    Double,
    Triple,
    HomeRun,
    FieldError,
    FieldOut,
    GroundedIntoDoublePlay,
    ForceOut,
    FieldersChoiceOut,
    DoublePlay,
    SacFly,
    SacBunt,
    FieldersChoice,
}

impl PlayEvent {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "single" => Some(PlayEvent::Single),
            "double" => Some(PlayEvent::Double),
            "triple" => Some(PlayEvent::Triple),
            "home_run" => Some(PlayEvent::HomeRun),
            "field_error" => Some(PlayEvent::FieldError),
            "field_out" => Some(PlayEvent::FieldOut),
            "grounded_into_double_play" => Some(PlayEvent::GroundedIntoDoublePlay),
            "force_out" => Some(PlayEvent::ForceOut),
            "fielders_choice_out" => Some(PlayEvent::FieldersChoiceOut),
            "double_play" => Some(PlayEvent::DoublePlay),
            "sac_fly" => Some(PlayEvent::SacFly),
            "sac_bunt" => Some(PlayEvent::SacBunt),
            "fielders_choice" => Some(PlayEvent::FieldersChoice),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayEvent::Single => "Single",
            PlayEvent::Double => "Double",
            PlayEvent::Triple => "Triple",
            PlayEvent::HomeRun => "Home Run",
            PlayEvent::FieldError => "Error",
            PlayEvent::FieldOut => "Out",
            PlayEvent::GroundedIntoDoublePlay | PlayEvent::DoublePlay => "Double Play",
            PlayEvent::ForceOut => "Force Out",
            PlayEvent::FieldersChoiceOut => "Fielder's Choice - Out",
            PlayEvent::SacFly => "Sac Fly",
            PlayEvent::SacBunt => "Sac Bunt",
            PlayEvent::FieldersChoice => "Fielder's Choice",
        }
    }
}

/// Result of a single pitch that was not put in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchResult {
    Ball,
    BlockedBall,
    CalledStrike,
    Foul,
    FoulBunt,
    FoulTip,
    BuntFoulTip,
    HitByPitch,
    SwingingStrike,
    SwingingStrikeBlocked,
    FieldersChoiceOut,
    ForceOut,
    MissedBunt,
    IntentBall,
    Pitchout,
    AutomaticBall,
    AutomaticStrike,
}

impl PitchResult {
    pub fn from_description(description: &str) -> Option<Self> {
        match description {
            "ball" => Some(PitchResult::Ball),
            "blocked_ball" => Some(PitchResult::BlockedBall),
            "called_strike" => Some(PitchResult::CalledStrike),
            "foul" => Some(PitchResult::Foul),
            "foul_bunt" => Some(PitchResult::FoulBunt),
            "foul_tip" => Some(PitchResult::FoulTip),
            "bunt_foul_tip" => Some(PitchResult::BuntFoulTip),
            "hit_by_pitch" => Some(PitchResult::HitByPitch),
            "swinging_strike" => Some(PitchResult::SwingingStrike),
            "swinging_strike_blocked" => Some(PitchResult::SwingingStrikeBlocked),
            "fielders_choice_out" => Some(PitchResult::FieldersChoiceOut),
            "force_out" => Some(PitchResult::ForceOut),
            "missed_bunt" => Some(PitchResult::MissedBunt),
            "intent_ball" => Some(PitchResult::IntentBall),
            "pitchout" => Some(PitchResult::Pitchout),
            "automatic_ball" => Some(PitchResult::AutomaticBall),
            "automatic_strike" => Some(PitchResult::AutomaticStrike),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PitchResult::Ball | PitchResult::BlockedBall => "Ball",
            PitchResult::CalledStrike => "Called Strike",
            PitchResult::Foul | PitchResult::FoulBunt => "Foul",
            PitchResult::FoulTip | PitchResult::BuntFoulTip => "Foul Tip",
            PitchResult::HitByPitch => "HBP",
            PitchResult::SwingingStrike | PitchResult::SwingingStrikeBlocked => "Swinging Strike",
            PitchResult::FieldersChoiceOut => "Fielder's Choice",
            PitchResult::ForceOut => "Force Out",
            PitchResult::MissedBunt => "Missed Bunt",
            PitchResult::IntentBall => "Intentional Ball",
            PitchResult::Pitchout => "Pitchout",
            PitchResult::AutomaticBall => "Automatic Ball",
            PitchResult::AutomaticStrike => "Automatic Strike",
        }
    }
}

/// Whether a pitch description means the ball was put in play
/// (`hit_into_play`, `hit_into_play_no_out`, `hit_into_play_score`).
pub fn is_in_play(description: &str) -> bool {
    description.starts_with("hit_into_play")
}

/// Human-readable result for a pitch.
///
/// Balls in play are labelled by their event (raw event code when unmapped).
/// Other pitches are labelled by their description; an unmapped description
/// falls back to the raw event code, or to the raw description when the
/// pitch carries no event.
pub fn format_result(event: &str, description: &str) -> String {
    if is_in_play(description) {
        return PlayEvent::from_code(event)
            .map_or_else(|| event.to_string(), |e| e.label().to_string());
    }
    match PitchResult::from_description(description) {
        Some(result) => result.label().to_string(),
        None if !event.is_empty() => event.to_string(),
        None => description.to_string(),
    }
}
