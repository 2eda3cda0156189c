// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;
pub mod types;

// ── Decorator layers ────────────────────────────────────────────────────────
pub mod factory;
pub mod reliable;

// ── Provider implementations ────────────────────────────────────────────────
pub mod compatible;

// ── Re-exports ──────────────────────────────────────────────────────────────
pub use compatible::OpenAiCompatibleProvider;
pub use factory::{create_provider, generator_identity, provider_name_for};
pub use http_client::build_provider_client;
pub use reliable::ReliableProvider;
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::Provider;
pub use types::{MessageRole, ProviderMessage, ProviderResponse, messages_from_turns};
