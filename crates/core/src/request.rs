use crate::{BuildError, Format, Identity, Ink};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeckRequest {
    pub request: String,
    pub target_size: u32,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub format: Format,
}

impl DeckRequest {
    pub fn new(request: impl Into<String>, target_size: u32) -> Self {
        Self {
            request: request.into(),
            target_size,
            colors: Vec::new(),
            format: Format::default(),
        }
    }

    pub fn with_colors(mut self, colors: &[&str]) -> Self {
        self.colors = colors.iter().map(|value| value.to_string()).collect();
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.request.trim().is_empty() {
            return Err(BuildError::InvalidRequest("request text is empty".to_string()));
        }
        if self.target_size == 0 {
            return Err(BuildError::InvalidRequest(
                "target size must be positive".to_string(),
            ));
        }
        self.explicit_identity().map(|_| ())
    }

    /// The caller's inks, first two distinct entries in the order given.
    /// `None` when the caller left the choice to the builder.
    pub fn explicit_identity(&self) -> Result<Option<Identity>, BuildError> {
        let mut inks: Vec<Ink> = Vec::new();
        for raw in self.colors.iter().filter(|raw| !raw.trim().is_empty()) {
            let ink = Ink::from_name(raw)
                .ok_or_else(|| BuildError::InvalidRequest(format!("unknown ink {raw:?}")))?;
            if !inks.contains(&ink) {
                inks.push(ink);
            }
        }
        inks.truncate(2);
        Ok(Identity::new(inks))
    }
}
