use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Token prefixes whose following characters are secret.
static PREFIX_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:sk-|sk_|ghp_|github_pat_|gho_|ghu_|ghs_|hf_|glpat-|xox[bpsa]-|xapp-|ya29\.|AIza|AKIA|ASIA|eyJ)[A-Za-z0-9\-_.:+/=]+",
    )
    .expect("secret prefix pattern is valid")
});

/// `key=value`, header and JSON-field forms; group 1 is kept.
static MARKED_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)((?:authorization:\s*bearer\s+)|(?:"authorization"\s*:\s*"bearer\s+)|(?:\b(?:api_key|access_token|refresh_token|password|secret)=)|(?:"(?:api_key|access_token|refresh_token|token|secret|password|client_secret)"\s*:\s*"))[A-Za-z0-9\-_.:+/=]+"#,
    )
    .expect("secret marker pattern is valid")
});

/// Redact provider keys and tokens from text that may reach logs or the
/// terminal.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let marked = MARKED_VALUES.replace_all(input, "${1}[REDACTED]");
    let rescrubbed = match PREFIX_TOKENS.replace_all(&marked, REDACTED) {
        Cow::Borrowed(_) => None,
        Cow::Owned(owned) => Some(owned),
    };
    rescrubbed.map_or(marked, Cow::Owned)
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }
    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let sanitized = sanitize_api_error(&body);
    anyhow::anyhow!("{provider} API error ({status}): {sanitized}")
}
