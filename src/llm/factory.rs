use super::compatible::OpenAiCompatibleProvider;
use super::reliable::ReliableProvider;
use super::traits::Provider;
use crate::config::Config;
use crate::error::LlmError;

/// Short provider label derived from the endpoint host.
pub fn provider_name_for(base_url: &str) -> &'static str {
    let Some(host) = host_of(base_url) else {
        return "compatible";
    };
    match host.as_str() {
        h if h.ends_with("api.openai.com") => "openai",
        h if h.ends_with("openrouter.ai") => "openrouter",
        h if h.ends_with("api.groq.com") => "groq",
        h if h.ends_with("api.mistral.ai") => "mistral",
        h if h.ends_with("api.deepseek.com") => "deepseek",
        h if h.ends_with("api.together.xyz") => "together",
        h if is_loopback(h) => "local",
        _ => "compatible",
    }
}

/// Lowercased host of `base_url`; IPv6 hosts keep their brackets.
fn host_of(base_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(base_url.trim()).ok()?;
    url.host_str().map(str::to_ascii_lowercase)
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0" | "[::1]")
}

fn is_local(base_url: &str) -> bool {
    host_of(base_url).is_some_and(|host| is_loopback(&host))
}

/// Build the generator described by `config`, wrapped in retry logic.
///
/// Hosted endpoints need an API key; local servers do not.
pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>, LlmError> {
    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    if api_key.is_none() && !is_local(&config.base_url) {
        return Err(LlmError::MissingApiKey);
    }

    let name = provider_name_for(&config.base_url);
    let inner = OpenAiCompatibleProvider::new(
        name,
        &config.base_url,
        api_key,
        config.reliability.request_timeout_secs,
    );
    tracing::debug!(provider = name, base_url = %config.base_url, "provider configured");

    Ok(Box::new(ReliableProvider::new(
        Box::new(inner),
        config.reliability.provider_retries,
        config.reliability.provider_backoff_ms,
    )))
}

/// `provider/model`, as recorded in session metadata.
pub fn generator_identity(provider: &dyn Provider, model: &str) -> String {
    format!("{}/{model}", provider.name())
}
