pub mod openai {
    pub const API_BASE: &str = "https://api.openai.com/v1";
    pub const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";
    pub const MODELS_ENDPOINT: &str = "/models";
    pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
}

pub mod anthropic {
    pub const API_BASE: &str = "https://api.anthropic.com/v1";
    pub const MESSAGES_ENDPOINT: &str = "/messages";
    pub const API_VERSION: &str = "2023-06-01";
    pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";
}

pub mod ollama {
    pub const LOCAL_API_BASE: &str = "http://localhost:11434/v1";
    pub const CLOUD_API_BASE: &str = "https://ollama.com/v1";
    pub const TAGS_ENDPOINT: &str = "/api/tags";
    pub const DEFAULT_PORT_MARKER: &str = ":11434";
    pub const CLOUD_DOMAIN: &str = "ollama.com";
    pub const API_KEY_ENV_VAR: &str = "OLLAMA_API_KEY";
}

pub mod deepseek {
    pub const API_BASE: &str = "https://api.deepseek.com/v1";
    pub const API_KEY_ENV_VAR: &str = "DEEPSEEK_API_KEY";
}

pub mod openrouter {
    pub const API_BASE: &str = "https://openrouter.ai/api/v1";
    pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
}

pub mod gemini {
    pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
    pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
}

pub mod groq {
    pub const API_BASE: &str = "https://api.groq.com/openai/v1";
    pub const API_KEY_ENV_VAR: &str = "GROQ_API_KEY";
}

pub mod azure_openai {
    pub const API_KEY_ENV_VAR: &str = "AZURE_OPENAI_API_KEY";
}
