use serde::Deserialize;

use super::validation::{ValidationErrors, check_required_text};

pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Body of `POST /categories/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
}

/// A category that passed validation and may be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
}

impl CategoryPayload {
    pub fn validate(self) -> Result<NewCategory, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text(&mut errors, "name", &self.name, MAX_CATEGORY_NAME_LEN);
        errors.into_result(NewCategory { name: self.name })
    }
}
