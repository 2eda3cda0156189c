use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const MICROS_PER_DOLLAR: i64 = 1_000_000;

/// Monetary amount in millionths of a US dollar.
///
/// Persisted as a decimal dollar string (`"0.029350"`) so that session
/// records round-trip exactly. Deserialization also accepts plain JSON
/// numbers and longer decimal strings written by older logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cost(i64);

impl Cost {
    pub const ZERO: Self = Self(0);

    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn micros(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Parse a decimal dollar amount. Digits beyond the sixth decimal place
    /// are truncated.
    pub fn parse_dollars(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut fraction_micros: i64 = 0;
        for (index, digit) in fraction.chars().take(6).enumerate() {
            let value = i64::from(digit.to_digit(10)?);
            let exponent = u32::try_from(5 - index).ok()?;
            fraction_micros += value * 10_i64.pow(exponent);
        }

        let micros = whole
            .checked_mul(MICROS_PER_DOLLAR)?
            .checked_add(fraction_micros)?;
        Some(Self(if negative { -micros } else { micros }))
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_dollar = MICROS_PER_DOLLAR.unsigned_abs();
        write!(f, "{sign}{}.{:06}", abs / per_dollar, abs % per_dollar)
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        Self::parse_dollars(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid cost amount: {text}")))
    }
}

/// Token usage reported by one generator call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    pub model_pattern: String,
    pub input_cost_per_million: f64,
    pub output_cost_per_million: f64,
}

impl ModelPricing {
    #[must_use]
    pub fn estimate(&self, usage: TokenUsage) -> Cost {
        let input_micros_per_million = micros_per_million(self.input_cost_per_million);
        let output_micros_per_million = micros_per_million(self.output_cost_per_million);

        let input_cost = i128::from(usage.input_tokens) * i128::from(input_micros_per_million)
            / i128::from(1_000_000_i64);
        let output_cost = i128::from(usage.output_tokens) * i128::from(output_micros_per_million)
            / i128::from(1_000_000_i64);
        let total = input_cost + output_cost;

        Cost::from_micros(i64::try_from(total).unwrap_or(i64::MAX))
    }
}

fn micros_per_million(cost_per_million: f64) -> i64 {
    let scaled = (cost_per_million * 1_000_000.0).round();
    let text = format!("{scaled:.0}");
    text.parse::<i64>().unwrap_or_default()
}

/// Known list prices, most specific pattern first.
#[must_use]
pub fn default_pricing() -> Vec<ModelPricing> {
    vec![
        ModelPricing {
            model_pattern: "gpt-4-turbo".into(),
            input_cost_per_million: 10.0,
            output_cost_per_million: 30.0,
        },
        ModelPricing {
            model_pattern: "gpt-4o-mini".into(),
            input_cost_per_million: 0.15,
            output_cost_per_million: 0.6,
        },
        ModelPricing {
            model_pattern: "gpt-4o".into(),
            input_cost_per_million: 2.5,
            output_cost_per_million: 10.0,
        },
        ModelPricing {
            model_pattern: "gpt-4".into(),
            input_cost_per_million: 30.0,
            output_cost_per_million: 60.0,
        },
        ModelPricing {
            model_pattern: "gpt-3.5-turbo".into(),
            input_cost_per_million: 0.5,
            output_cost_per_million: 1.5,
        },
        ModelPricing {
            model_pattern: "claude-3-5-sonnet".into(),
            input_cost_per_million: 3.0,
            output_cost_per_million: 15.0,
        },
        ModelPricing {
            model_pattern: "claude-3-5-haiku".into(),
            input_cost_per_million: 0.8,
            output_cost_per_million: 4.0,
        },
    ]
}

#[must_use]
pub fn lookup_pricing<'a>(
    model: &str,
    pricing_table: &'a [ModelPricing],
) -> Option<&'a ModelPricing> {
    pricing_table
        .iter()
        .find(|pricing| model.contains(&pricing.model_pattern))
}
