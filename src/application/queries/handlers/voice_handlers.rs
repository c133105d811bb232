//! Voice Query Handlers

use crate::application::error::ApplicationError;
use crate::application::queries::ListVoicesQuery;
use crate::domain::voice::catalog;

/// 目录音色响应
#[derive(Debug, Clone)]
pub struct VoiceResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub legacy: bool,
}

impl From<&catalog::CatalogVoice> for VoiceResponse {
    fn from(voice: &catalog::CatalogVoice) -> Self {
        Self {
            id: voice.id.to_string(),
            name: voice.name.to_string(),
            description: voice.description.to_string(),
            legacy: voice.legacy,
        }
    }
}

/// ListVoices Handler - 目录是内置常量，无需仓储
pub struct ListVoicesHandler;

impl ListVoicesHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        _query: ListVoicesQuery,
    ) -> Result<Vec<VoiceResponse>, ApplicationError> {
        Ok(catalog::all().iter().map(VoiceResponse::from).collect())
    }
}

impl Default for ListVoicesHandler {
    fn default() -> Self {
        Self::new()
    }
}
