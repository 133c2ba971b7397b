use serde::Deserialize;

use crate::errors::{ApiError, ValidationErrors};

// Tag create / update request; also used for the nested tags of a recipe
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TagPayload {
    pub name: Option<String>,
}

impl TagPayload {
    /// Returns the trimmed name, or `None` when a partial update leaves it out.
    pub fn validate(self, partial: bool) -> Result<Option<String>, ApiError> {
        let mut errors = ValidationErrors::default();
        errors.check_name("name", self.name.as_deref(), !partial);
        errors.into_result()?;
        Ok(self.name.map(|n| n.trim().to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TagQuery {
    pub assigned_only: Option<u8>,
}

impl TagQuery {
    pub fn assigned_only(&self) -> bool {
        self.assigned_only.unwrap_or(0) != 0
    }
}
