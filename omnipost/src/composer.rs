//! Cross-platform post composer: the draft a user builds up before it is sent as `POST /posts`.

use crate::error::ApiError;
use crate::models::{CreatePost, Platform, SocialAccount};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    content: String,
    selected_platforms: Vec<Platform>,
    media_urls: Vec<String>,
    scheduled_for: Option<OffsetDateTime>,
}

impl PostDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn selected_platforms(&self) -> &[Platform] {
        &self.selected_platforms
    }

    pub fn media_urls(&self) -> &[String] {
        &self.media_urls
    }

    pub fn scheduled_for(&self) -> Option<OffsetDateTime> {
        self.scheduled_for
    }

    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
    }

    /// Selects the platform, or deselects it if already selected. Selection order is kept.
    pub fn toggle_platform(&mut self, platform: Platform) {
        if let Some(idx) = self.selected_platforms.iter().position(|p| *p == platform) {
            self.selected_platforms.remove(idx);
        } else {
            self.selected_platforms.push(platform);
        }
    }

    pub fn add_media_url(&mut self, url: &str) {
        self.media_urls.push(url.to_string());
    }

    /// Out-of-range indexes are ignored
    pub fn remove_media_url(&mut self, index: usize) {
        if index < self.media_urls.len() {
            self.media_urls.remove(index);
        }
    }

    pub fn set_scheduled_for(&mut self, when: Option<OffsetDateTime>) {
        self.scheduled_for = when;
    }

    /// Parses an RFC 3339 timestamp (eg, "2024-05-01T09:00:00Z") as the schedule time
    pub fn schedule_at(&mut self, when: &str) -> Result<(), ApiError> {
        self.scheduled_for = Some(parse_timestamp(when)?);
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Builds the request body. A draft needs non-blank content and at least one platform.
    pub fn to_request(&self) -> Result<CreatePost, ApiError> {
        if self.content.trim().is_empty() {
            return Err(ApiError::InvalidRequest("post content is empty".to_string()));
        }
        if self.selected_platforms.is_empty() {
            return Err(ApiError::InvalidRequest(
                "no platform selected for post".to_string(),
            ));
        }
        let scheduled_for = match self.scheduled_for {
            Some(when) => Some(format_timestamp(when)?),
            None => None,
        };
        Ok(CreatePost {
            content: Some(self.content.clone()),
            selectedPlatforms: Some(self.selected_platforms.clone()),
            mediaUrls: Some(self.media_urls.clone()),
            scheduledFor: scheduled_for,
        })
    }
}

pub fn parse_timestamp(when: &str) -> Result<OffsetDateTime, ApiError> {
    OffsetDateTime::parse(when, &Rfc3339)
        .map_err(|e| ApiError::InvalidRequest(format!("not an RFC 3339 timestamp ({when}): {e}")))
}

pub fn format_timestamp(when: OffsetDateTime) -> Result<String, ApiError> {
    when.format(&Rfc3339)
        .map_err(|e| ApiError::InvalidRequest(format!("couldn't format timestamp: {e}")))
}

/// Platforms with at least one active connected account, in canonical order
pub fn available_platforms(accounts: &[SocialAccount]) -> Vec<Platform> {
    Platform::ALL
        .iter()
        .copied()
        .filter(|p| accounts.iter().any(|a| a.isActive && a.platform == *p))
        .collect()
}
