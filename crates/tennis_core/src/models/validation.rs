//! Validation module for player profiles
//!
//! Upstream stat sources are occasionally noisy, so out-of-range values are
//! clamped and recorded rather than rejected. Strict mode turns every recorded
//! adjustment into an error instead.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::engine::probability::ConditionalServeProbabilities;
use crate::error::{Result, SimError};
use crate::models::player::{PlayerProfile, PlayerSlot};

/// Profile inputs and the conditionals derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    FirstServeInPct,
    FirstServeWonPct,
    SecondServeWonPct,
    AceRate,
    DoubleFaultRate,
    ReturnWonPct,
    AceGivenFirstIn,
    DoubleFaultGivenSecond,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileField::Name => "name",
            ProfileField::FirstServeInPct => "first_serve_in_pct",
            ProfileField::FirstServeWonPct => "first_serve_won_pct",
            ProfileField::SecondServeWonPct => "second_serve_won_pct",
            ProfileField::AceRate => "ace_rate",
            ProfileField::DoubleFaultRate => "double_fault_rate",
            ProfileField::ReturnWonPct => "return_won_pct",
            ProfileField::AceGivenFirstIn => "ace_given_first_in",
            ProfileField::DoubleFaultGivenSecond => "double_fault_given_second",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// A raw rate outside `[0, 1]`.
    OutOfRange,
    /// A conditional whose denominator is zero; replaced by 0.
    UndefinedRatio,
    /// A conditional above 1 (e.g. ace rate larger than first-serve-in rate).
    DerivedAboveOne,
}

/// One value the engine replaced before simulating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileAdjustment {
    pub field: ProfileField,
    pub kind: AdjustmentKind,
    pub raw: f64,
    pub adjusted: f64,
}

impl fmt::Display for ProfileAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AdjustmentKind::OutOfRange => {
                write!(f, "{} = {} is outside [0, 1], clamped to {}", self.field, self.raw, self.adjusted)
            }
            AdjustmentKind::UndefinedRatio => {
                write!(f, "{} is undefined (zero denominator), using {}", self.field, self.adjusted)
            }
            AdjustmentKind::DerivedAboveOne => {
                write!(f, "{} = {:.4} exceeds 1, clamped to {}", self.field, self.raw, self.adjusted)
            }
        }
    }
}

/// A profile that is safe to simulate, plus what was changed to make it so.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedProfile {
    pub profile: PlayerProfile,
    pub adjustments: Vec<ProfileAdjustment>,
}

impl SanitizedProfile {
    pub fn is_adjusted(&self) -> bool {
        !self.adjustments.is_empty()
    }
}

/// Profile validation utility
pub struct ProfileValidator;

impl ProfileValidator {
    /// Validate a profile and clamp noisy rates.
    ///
    /// Non-finite values and blank names always fail. With `strict`, any value
    /// that would have been clamped fails too.
    pub fn sanitize(
        slot: PlayerSlot,
        profile: &PlayerProfile,
        strict: bool,
    ) -> Result<SanitizedProfile> {
        if profile.name.trim().is_empty() {
            return Err(SimError::InvalidProfile {
                player: slot,
                field: ProfileField::Name,
                reason: "name cannot be empty".to_string(),
            });
        }

        let mut clean = profile.clone();
        let mut adjustments = Vec::new();

        for (field, value) in [
            (ProfileField::FirstServeInPct, &mut clean.first_serve_in_pct),
            (ProfileField::FirstServeWonPct, &mut clean.first_serve_won_pct),
            (ProfileField::SecondServeWonPct, &mut clean.second_serve_won_pct),
            (ProfileField::AceRate, &mut clean.ace_rate),
            (ProfileField::DoubleFaultRate, &mut clean.double_fault_rate),
            (ProfileField::ReturnWonPct, &mut clean.return_won_pct),
        ] {
            let raw = *value;
            if !raw.is_finite() {
                return Err(SimError::InvalidProfile {
                    player: slot,
                    field,
                    reason: format!("value must be finite, got {}", raw),
                });
            }
            if !(0.0..=1.0).contains(&raw) {
                let adjusted = raw.clamp(0.0, 1.0);
                adjustments.push(ProfileAdjustment {
                    field,
                    kind: AdjustmentKind::OutOfRange,
                    raw,
                    adjusted,
                });
                *value = adjusted;
            }
        }

        adjustments.extend(ConditionalServeProbabilities::derive(&clean).adjustments);

        if strict {
            if let Some(first) = adjustments.first() {
                return Err(SimError::InvalidProfile {
                    player: slot,
                    field: first.field,
                    reason: first.to_string(),
                });
            }
        }

        for adjustment in &adjustments {
            warn!(player = %slot, name = %profile.name, "profile adjusted: {}", adjustment);
        }

        Ok(SanitizedProfile { profile: clean, adjustments })
    }
}
