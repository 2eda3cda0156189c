use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) =
            std::env::var("SCRIPTPILOT_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Ok(base_url) = std::env::var("SCRIPTPILOT_BASE_URL")
            && !base_url.is_empty()
        {
            self.base_url = base_url;
        }

        if let Ok(model) = std::env::var("SCRIPTPILOT_MODEL")
            && !model.is_empty()
        {
            self.default_model = model;
        }

        if let Ok(temp_str) = std::env::var("SCRIPTPILOT_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.default_temperature = temp;
        }

        if let Ok(iter_str) = std::env::var("SCRIPTPILOT_MAX_ITERATIONS")
            && let Ok(iterations) = iter_str.parse::<u32>()
            && iterations > 0
        {
            self.agent.max_iterations = iterations;
        }
    }
}
