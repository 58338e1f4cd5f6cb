#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub collection: String,
    /// Payload field holding the list of format names a card is legal in.
    pub format_field: String,
    pub embed_url: String,
    pub embed_model: String,
    pub search_url: String,
    pub search_api_key: Option<String>,
    pub generate_url: String,
    pub generate_model: String,
    pub search_timeout_ms: u64,
    pub generation_timeout_ms: u64,
    pub identity_samples_per_ink: usize,
    pub agent_max_iterations: u32,
    pub agent_prompt_candidates: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collection: "cards".to_string(),
            format_field: "formats".to_string(),
            embed_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            search_url: "http://localhost:6333".to_string(),
            search_api_key: None,
            generate_url: "http://localhost:11434".to_string(),
            generate_model: "llama3.1".to_string(),
            search_timeout_ms: 10_000,
            generation_timeout_ms: 60_000,
            identity_samples_per_ink: 3,
            agent_max_iterations: 12,
            agent_prompt_candidates: 40,
        }
    }
}
