use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule applied when a fractional currency amount becomes a whole-unit amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoundingPolicy {
    /// Truncate toward zero
    #[default]
    Floor,
    /// Round away from zero
    Ceil,
    /// Round to nearest, half away from zero
    Round,
}

impl RoundingPolicy {
    /// Currency amounts are whole units (no minor unit)
    pub const SCALE: u32 = 0;

    fn strategy(&self) -> RoundingStrategy {
        match self {
            RoundingPolicy::Floor => RoundingStrategy::ToZero,
            RoundingPolicy::Ceil => RoundingStrategy::AwayFromZero,
            RoundingPolicy::Round => RoundingStrategy::MidpointAwayFromZero,
        }
    }

    /// Apply this policy to a decimal amount, producing a whole-unit value
    pub fn apply(&self, amount: Decimal) -> Decimal {
        amount
            .round_dp_with_strategy(Self::SCALE, self.strategy())
            .normalize()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingPolicy::Floor => "floor",
            RoundingPolicy::Ceil => "ceil",
            RoundingPolicy::Round => "round",
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoundingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "floor" => Ok(RoundingPolicy::Floor),
            "ceil" => Ok(RoundingPolicy::Ceil),
            "round" => Ok(RoundingPolicy::Round),
            _ => Err(format!("Invalid rounding policy: {}", s)),
        }
    }
}
