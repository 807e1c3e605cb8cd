//! Farmer assistant service

use crate::error::{AppError, AppResult};
use crate::external::assistant::{AssistantError, GeminiClient};

const PREAMBLE: &str = "Eres el asistente de EcoGuardian, una app que vigila el riesgo de \
rancha (tizón tardío) en cultivos de papa. Responde de forma breve y práctica.";

/// Assistant service
#[derive(Clone)]
pub struct AssistantService {
    client: Option<GeminiClient>,
}

impl AssistantService {
    pub fn new(client: Option<GeminiClient>) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Answer a user message
    pub async fn reply(&self, message: &str) -> AppResult<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::invalid_input("message", "Message is empty"));
        }

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("Assistant".to_string()))?;

        let prompt = format!("{}\n\nUsuario: {}\nRespuesta:", PREAMBLE, message);
        client.generate(&prompt).await.map_err(|e| match e {
            AssistantError::Auth => AppError::AssistantError("authentication failed".into()),
            AssistantError::RateLimited => {
                AppError::AssistantError("request limit exceeded".into())
            }
            AssistantError::Upstream(msg) => AppError::AssistantError(msg),
        })
    }
}
