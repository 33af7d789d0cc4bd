//! Model catalog used for placeholder and display text.
//!
//! The catalog is purely cosmetic: requests are sent with whatever id the
//! user selected, and any model id the server reports that is not listed
//! here is displayed verbatim.

use rustc_hash::FxHashSet;
use std::sync::LazyLock;

/// The generic auto-routing choice; the server picks the concrete model.
pub const AUTO_MODEL_ID: &str = "auto";

/// Suffix appended to a concrete model id to request web-search augmentation.
pub const WEB_SEARCH_SUFFIX: &str = ":online";

/// A selectable chat model.
#[derive(Debug, Clone, Copy)]
pub struct ModelOption {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: Option<&'static str>,
}

const fn model(id: &'static str, name: &'static str, provider: &'static str) -> ModelOption {
    ModelOption {
        id,
        name,
        provider: Some(provider),
    }
}

pub static ALL_MODEL_OPTIONS: &[ModelOption] = &[
    ModelOption {
        id: AUTO_MODEL_ID,
        name: "Automatic",
        provider: None,
    },
    model("anthropic/claude-sonnet-4", "Claude Sonnet 4", "Anthropic"),
    model("anthropic/claude-opus-4", "Claude Opus 4", "Anthropic"),
    model(
        "anthropic/claude-3.7-sonnet:thinking",
        "Claude 3.7 Sonnet (Thinking)",
        "Anthropic",
    ),
    model("x-ai/grok-3-mini-beta", "Grok 3 Mini β", "xAI"),
    model("x-ai/grok-3-beta", "Grok 3 β", "xAI"),
    model("openai/o4-mini-high", "GPT-o4 Mini High", "OpenAI"),
    model("openai/codex-mini", "OpenAI Codex Mini", "OpenAI"),
    model("openai/gpt-4.1", "GPT-4.1", "OpenAI"),
    model("openai/gpt-4.5-preview", "GPT-4.5 Preview", "OpenAI"),
    model(
        "google/gemini-2.5-pro-preview",
        "Gemini 2.5 Pro Preview",
        "Google",
    ),
    model(
        "google/gemini-2.5-flash-preview",
        "Gemini 2.5 Flash Preview",
        "Google",
    ),
    model(
        "deepseek/deepseek-chat-v3-0324",
        "DeepSeek Chat V3 0324",
        "DeepSeek",
    ),
    model("amazon/nova-lite-v1", "Nova Lite V1", "Amazon"),
    model(
        "anthropic/claude-3.5-haiku-20241022:beta",
        "Claude 3.5 Haiku 20241022 β",
        "Anthropic",
    ),
    model("anthropic/claude-3.7-sonnet", "Claude 3.7 Sonnet", "Anthropic"),
    model(
        "anthropic/claude-3.7-sonnet:beta",
        "Claude 3.7 Sonnet β",
        "Anthropic",
    ),
    model(
        "cohere/command-r-plus-08-2024",
        "Command R Plus 08 2024",
        "Cohere",
    ),
    model("cohere/command-r7b-12-2024", "Command R7B 12 2024", "Cohere"),
    model("deepseek/deepseek-r1", "DeepSeek R1", "DeepSeek"),
    model("google/gemini-2.0-flash-001", "Gemini 2.0 Flash 001", "Google"),
    model(
        "meta-llama/llama-3.3-70b-instruct",
        "Llama 3.3 70B Instruct",
        "Meta-Llama",
    ),
    model("meta-llama/llama-4-maverick", "Llama 4 Maverick", "Meta-Llama"),
    model("meta-llama/llama-4-scout", "Llama 4 Scout", "Meta-Llama"),
    model("microsoft/phi-4", "Phi-4", "Microsoft"),
    model("mistral/ministral-8b", "Ministral 8B", "Mistral"),
    model(
        "mistralai/mistral-large-2407",
        "Mistral Large 2407",
        "MistralAI",
    ),
    model("mistralai/mistral-medium-3", "Mistral Medium 3", "MistralAI"),
    model(
        "nousresearch/hermes-3-llama-3.1-70b",
        "Hermes 3 Llama 3.1 70B",
        "NousResearch",
    ),
    model(
        "nvidia/llama-3.1-nemotron-ultra-253b-v1:free",
        "Llama 3.1 Nemotron Ultra 253B V1 (Free)",
        "Nvidia",
    ),
    model("openai/gpt-4-turbo", "GPT-4 Turbo", "OpenAI"),
    model("openai/gpt-4.1-mini", "GPT-4.1 Mini", "OpenAI"),
    model("openai/gpt-4.1-nano", "GPT-4.1 Nano", "OpenAI"),
    model("openai/gpt-4o", "GPT-4o", "OpenAI"),
    model("openai/gpt-4o-mini", "GPT-4o Mini", "OpenAI"),
    model("openai/o3-mini", "GPT-o3 Mini", "OpenAI"),
    model("openai/o4-mini", "GPT-o4 Mini", "OpenAI"),
    model("qwen/qwen-2.5-7b-instruct", "Qwen 2.5 7B Instruct", "Qwen"),
];

static TOP_TIER_MODEL_IDS: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    [
        AUTO_MODEL_ID,
        "anthropic/claude-opus-4",
        "anthropic/claude-sonnet-4",
        "x-ai/grok-3-mini-beta",
        "x-ai/grok-3-mini-beta:online",
        "openai/o4-mini-high",
        "anthropic/claude-3.7-sonnet:thinking",
        "google/gemini-2.5-pro-preview",
        "google/gemini-2.5-flash-preview",
        "openai/gpt-4.1",
        "openai/gpt-4.5-preview",
        "deepseek/deepseek-chat-v3-0324",
        "openai/codex-mini",
        "google/gemini-2.5-flash-preview-05-20",
        "x-ai/grok-3-beta",
    ]
    .into_iter()
    .collect()
});

/// Look up a catalog entry by exact model id.
#[must_use]
pub fn find_model(model_id: &str) -> Option<&'static ModelOption> {
    ALL_MODEL_OPTIONS.iter().find(|m| m.id == model_id)
}

/// Display name for a model id.
///
/// Web-search variants (`:online`) resolve through their base id and gain a
/// "+ Web Search" suffix; unknown ids display as themselves.
#[must_use]
pub fn display_name(model_id: &str) -> String {
    let base_id = model_id
        .strip_suffix(WEB_SEARCH_SUFFIX)
        .unwrap_or(model_id);
    let base_name = find_model(base_id).map_or(base_id, |m| m.name);
    if base_id == model_id {
        base_name.to_string()
    } else {
        format!("{base_name} + Web Search")
    }
}

/// Whether a model id belongs to the top tier shown first in selectors.
#[must_use]
pub fn is_top_tier(model_id: &str) -> bool {
    TOP_TIER_MODEL_IDS.contains(model_id)
}
