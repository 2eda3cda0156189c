use super::types::{Cost, ModelPricing, TokenUsage, default_pricing, lookup_pricing};

/// Side-channel accumulator for generator spend.
///
/// Updated once per generator call. The loop's transitions never read it.
#[derive(Debug, Clone)]
pub struct CostMeter {
    model: String,
    pricing: Option<ModelPricing>,
    total: Cost,
    calls: u64,
    usage: TokenUsage,
}

impl CostMeter {
    pub fn new(model: &str) -> Self {
        Self::with_pricing(model, &default_pricing())
    }

    pub fn with_pricing(model: &str, table: &[ModelPricing]) -> Self {
        let pricing = lookup_pricing(model, table).cloned();
        if pricing.is_none() {
            tracing::debug!(model, "no pricing entry; cost will be reported as zero");
        }
        Self {
            model: model.to_string(),
            pricing,
            total: Cost::ZERO,
            calls: 0,
            usage: TokenUsage::default(),
        }
    }

    /// Record one generator call and return its estimated cost.
    pub fn record(&mut self, usage: Option<TokenUsage>) -> Cost {
        self.calls += 1;
        let Some(usage) = usage else {
            return Cost::ZERO;
        };

        self.usage.input_tokens += usage.input_tokens;
        self.usage.output_tokens += usage.output_tokens;

        let delta = self
            .pricing
            .as_ref()
            .map_or(Cost::ZERO, |pricing| pricing.estimate(usage));
        self.total = self.total.saturating_add(delta);
        delta
    }

    pub fn total(&self) -> Cost {
        self.total
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
