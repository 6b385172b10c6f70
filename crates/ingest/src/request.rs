use serde::{Deserialize, Serialize};
use store::UserId;

use crate::error::ValidationError;

/// A save as it arrives from a caller. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSaveRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "text_content")]
    pub text: Option<String>,
    pub user_id: Option<String>,
}

impl RawSaveRequest {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        user: UserId,
    ) -> Self {
        Self {
            url: Some(url.into()),
            title: Some(title.into()),
            text: Some(text.into()),
            user_id: Some(user.to_string()),
        }
    }

    /// Check that every field is present and non-blank, and parse the user id.
    pub fn validate(self) -> Result<SaveRequest, ValidationError> {
        let url = required(self.url, "url")?;
        let title = required(self.title, "title")?;
        let text = required(self.text, "text")?;
        let user_id = required(self.user_id, "user_id")?;
        let user = user_id
            .parse::<UserId>()
            .map_err(|_| ValidationError::InvalidUserId(user_id.clone()))?;
        Ok(SaveRequest {
            url,
            title,
            text,
            user,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// A validated save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub url: String,
    pub title: String,
    pub text: String,
    pub user: UserId,
}
