//! EU261 eligibility and compensation engine.
//!
//! Given a flight leg's timing, the route's great-circle distance, and
//! the incident type, decide whether compensation applies and at which
//! tier. The engine is deliberately conservative: business ambiguity
//! (unknown distance, missing actual arrival, extraordinary
//! circumstances) never raises an error — it returns a result flagged
//! for manual review so a human makes the call.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Thresholds (EU261 Articles 6 & 7)
// ---------------------------------------------------------------------------

/// Minimum arrival delay in minutes for delay compensation (inclusive).
pub const DELAY_THRESHOLD_MINUTES: i64 = 180;

/// Arrival delay below which the Art. 7(2) long-haul reduction may apply.
pub const REDUCTION_THRESHOLD_MINUTES: i64 = 240;

/// Upper bound of the short-haul tier in kilometres (inclusive).
pub const TIER_1_MAX_KM: f64 = 1500.0;

/// Upper bound of the medium-haul tier in kilometres (inclusive).
pub const TIER_2_MAX_KM: f64 = 3500.0;

/// Compensation for flights up to [`TIER_1_MAX_KM`].
pub const TIER_1_AMOUNT_EUR: Decimal = dec!(250);

/// Compensation for flights between [`TIER_1_MAX_KM`] and [`TIER_2_MAX_KM`].
pub const TIER_2_AMOUNT_EUR: Decimal = dec!(400);

/// Compensation for flights beyond [`TIER_2_MAX_KM`].
pub const TIER_3_AMOUNT_EUR: Decimal = dec!(600);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The kind of disruption a claim is about. Closed set; unknown values
/// fail at parse time rather than being string-checked downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Delay,
    Cancellation,
    DeniedBoarding,
    BaggageDelay,
}

impl IncidentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delay => "delay",
            Self::Cancellation => "cancellation",
            Self::DeniedBoarding => "denied_boarding",
            Self::BaggageDelay => "baggage_delay",
        }
    }
}

impl std::str::FromStr for IncidentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delay" => Ok(Self::Delay),
            "cancellation" => Ok(Self::Cancellation),
            "denied_boarding" => Ok(Self::DeniedBoarding),
            "baggage_delay" => Ok(Self::BaggageDelay),
            other => Err(format!("Unknown incident type '{other}'")),
        }
    }
}

/// Which regulation a decision is based on. Supplied by the caller from
/// route/region data; the engine dispatches on it but does not infer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulationBasis {
    Eu261,
    Dot,
    Cta,
    None,
}

impl RegulationBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eu261 => "eu261",
            Self::Dot => "dot",
            Self::Cta => "cta",
            Self::None => "none",
        }
    }
}

impl std::str::FromStr for RegulationBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eu261" => Ok(Self::Eu261),
            "dot" => Ok(Self::Dot),
            "cta" => Ok(Self::Cta),
            "none" => Ok(Self::None),
            other => Err(format!("Unknown regulation basis '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Everything the engine needs to decide one claim leg.
///
/// The extraordinary-circumstance and gate-offer flags are facts the
/// engine cannot know; the caller supplies them (possibly after asking
/// an admin) rather than the engine attempting any text classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub incident_type: IncidentType,
    /// Great-circle route distance, or `None` when the airports could
    /// not be resolved.
    pub distance_km: Option<f64>,
    /// Arrival delay in minutes, or `None` when the actual arrival has
    /// not been observed. Negative means early.
    pub arrival_delay_minutes: Option<i64>,
    /// Cancellation cause indicates weather / security / airport or ATC
    /// strike (crew strikes are airline-attributable and excluded).
    #[serde(default)]
    pub extraordinary_circumstance: bool,
    /// Airline already offered compensation at the gate (denied boarding).
    #[serde(default)]
    pub gate_compensation_offered: bool,
    pub regulation_basis: RegulationBasis,
}

/// Outcome of an eligibility evaluation. Computed fresh whenever inputs
/// change; only becomes authoritative once attached to a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub compensation_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub regulation_basis: RegulationBasis,
    pub reason: String,
    pub requires_manual_review: bool,
    /// Art. 7(2): a long-haul delay under 240 minutes may be halved at
    /// admin discretion. Advisory only; the amount is never auto-reduced.
    pub reducible: bool,
}

impl EligibilityResult {
    fn ineligible(basis: RegulationBasis, reason: impl Into<String>, manual: bool) -> Self {
        Self {
            eligible: false,
            compensation_amount: None,
            currency: None,
            regulation_basis: basis,
            reason: reason.into(),
            requires_manual_review: manual,
            reducible: false,
        }
    }

    fn eligible_eur(amount: Decimal, reason: impl Into<String>) -> Self {
        Self {
            eligible: true,
            compensation_amount: Some(amount),
            currency: Some("EUR".to_string()),
            regulation_basis: RegulationBasis::Eu261,
            reason: reason.into(),
            requires_manual_review: false,
            reducible: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tier lookup
// ---------------------------------------------------------------------------

/// EU261 Article 7 compensation tier by great-circle distance.
///
/// Intervals are half-open at the top: exactly 1500.0 km is the lower
/// tier, exactly 3500.0 km the middle tier.
pub fn tier_amount_eur(distance_km: f64) -> Decimal {
    if distance_km <= TIER_1_MAX_KM {
        TIER_1_AMOUNT_EUR
    } else if distance_km <= TIER_2_MAX_KM {
        TIER_2_AMOUNT_EUR
    } else {
        TIER_3_AMOUNT_EUR
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a claim leg against the compensation rules.
///
/// Never fails on business ambiguity: every uncertain case comes back as
/// a result with `requires_manual_review = true` and a reason string.
pub fn evaluate(input: &EvaluationInput) -> EligibilityResult {
    // DOT/CTA tier tables are not encoded yet; route those regions to a
    // human rather than guessing with EU261 amounts.
    match input.regulation_basis {
        RegulationBasis::Eu261 => {}
        basis @ (RegulationBasis::Dot | RegulationBasis::Cta) => {
            return EligibilityResult::ineligible(
                basis,
                format!(
                    "{} claims require manual assessment; no automated tier table",
                    basis.as_str()
                ),
                true,
            );
        }
        RegulationBasis::None => {
            return EligibilityResult::ineligible(
                RegulationBasis::None,
                "No applicable regulation for this route",
                false,
            );
        }
    }

    // Baggage delay falls under the Montreal Convention, not EU261
    // Article 7; there is no tier to compute.
    if input.incident_type == IncidentType::BaggageDelay {
        return EligibilityResult::ineligible(
            RegulationBasis::Eu261,
            "baggage claims require manual assessment under different regulation",
            true,
        );
    }

    let Some(distance_km) = input.distance_km else {
        return EligibilityResult::ineligible(RegulationBasis::Eu261, "distance unknown", true);
    };

    match input.incident_type {
        IncidentType::Cancellation => {
            // No minimum threshold for a confirmed cancellation.
            let mut result = EligibilityResult::eligible_eur(
                tier_amount_eur(distance_km),
                "cancellation confirmed; compensation per EU261 Article 7 tier",
            );
            if input.extraordinary_circumstance {
                // Extraordinary-circumstance determination is fact
                // dependent; flag for review, never auto-approve.
                result.requires_manual_review = true;
                result.reason = "cancellation cause may be an extraordinary circumstance; \
                                 manual review required before payout"
                    .to_string();
            }
            result
        }

        IncidentType::Delay => {
            let Some(delay) = input.arrival_delay_minutes else {
                return EligibilityResult::ineligible(
                    RegulationBasis::Eu261,
                    "awaiting actual arrival time",
                    true,
                );
            };
            if delay < DELAY_THRESHOLD_MINUTES {
                // Covers early and on-time arrivals too (delay <= 0).
                return EligibilityResult::ineligible(
                    RegulationBasis::Eu261,
                    format!(
                        "arrival delay of {delay} minutes is below the \
                         {DELAY_THRESHOLD_MINUTES}-minute threshold"
                    ),
                    false,
                );
            }
            let mut result = EligibilityResult::eligible_eur(
                tier_amount_eur(distance_km),
                format!("arrival delay of {delay} minutes meets the EU261 threshold"),
            );
            // Art. 7(2): long-haul delay under 4 hours may be halved if
            // the airline rerouted; that fact lives outside this engine,
            // so only flag it.
            if distance_km > TIER_2_MAX_KM && delay < REDUCTION_THRESHOLD_MINUTES {
                result.reducible = true;
            }
            result
        }

        IncidentType::DeniedBoarding => {
            // No minimum delay required by the regulation.
            let mut result = EligibilityResult::eligible_eur(
                tier_amount_eur(distance_km),
                "denied boarding; compensation per EU261 Article 7 tier",
            );
            if input.gate_compensation_offered {
                result.requires_manual_review = true;
                result.reason = "compensation already offered at the gate; \
                                 manual review required to avoid double payment"
                    .to_string();
            }
            result
        }

        IncidentType::BaggageDelay => unreachable!("handled above"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
