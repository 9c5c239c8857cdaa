use std::time::Duration;

use log::{debug, error, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::{ClassifyConfig, ProviderConfig};
use crate::error::ExtractError;
use crate::model::{Detection, Post, Recipe, RecipeRecord};
use crate::prompts::{
    with_caption, DETECTION_PROMPT, DETECTION_SYSTEM_PROMPT, EXTRACTION_PROMPT,
    EXTRACTION_SYSTEM_PROMPT,
};
use crate::schema::strict_schema;

/// Live classifier: one chat-completions call per post, detection first,
/// extraction only for captions that pass the confidence threshold.
pub struct Classifier {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    confidence_threshold: f64,
    stagger: Duration,
}

impl Classifier {
    /// Create a classifier from provider and classification configuration.
    pub fn new(provider: &ProviderConfig, classify: &ClassifyConfig) -> Result<Self, ExtractError> {
        let api_key = provider.resolve_api_key().ok_or_else(|| {
            config::ConfigError::Message(
                "api_key not found in config or OPENAI_API_KEY environment".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(provider.timeout))
            .build()?;

        Ok(Classifier {
            client,
            api_key,
            base_url: provider.resolve_base_url(),
            model: provider.model.clone(),
            temperature: provider.temperature,
            confidence_threshold: classify.confidence_threshold,
            stagger: Duration::from_millis(classify.stagger_ms),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        Classifier {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.1,
            confidence_threshold: 0.3,
            stagger: Duration::ZERO,
        }
    }

    /// Classify every post, one at a time with a fixed stagger delay.
    ///
    /// A failed call is logged and produces no record; it never aborts the run.
    pub async fn classify_posts(&self, posts: &[Post]) -> Vec<RecipeRecord> {
        let mut records = Vec::new();

        for (i, post) in posts.iter().enumerate() {
            info!("Classifying post {}/{}", i + 1, posts.len());
            match self.classify_post(post).await {
                Ok(record) => records.push(record),
                Err(e) => error!("Failed to classify post {}: {}", post.pk, e),
            }

            if !self.stagger.is_zero() && i + 1 < posts.len() {
                tokio::time::sleep(self.stagger).await;
            }
        }

        records
    }

    /// Detection pass, then extraction when the caption looks like a recipe.
    pub async fn classify_post(&self, post: &Post) -> Result<RecipeRecord, ExtractError> {
        let detection = self.detect(&post.caption_text).await?;

        if !detection.is_recipe || detection.confidence < self.confidence_threshold {
            debug!(
                "Post {} is not a recipe (confidence {:.2}): {}",
                post.pk, detection.confidence, detection.reasoning
            );
            return Ok(RecipeRecord {
                post_pk: post.pk.clone(),
                code: post.code.clone(),
                caption: post.caption_text.clone(),
                is_recipe: false,
                confidence: detection.confidence,
                recipe: None,
            });
        }

        let recipe = self.extract(&post.caption_text).await?;
        Ok(RecipeRecord {
            post_pk: post.pk.clone(),
            code: post.code.clone(),
            caption: post.caption_text.clone(),
            is_recipe: true,
            confidence: detection.confidence,
            recipe: Some(recipe),
        })
    }

    /// Ask the model whether a caption contains a recipe.
    pub async fn detect(&self, caption: &str) -> Result<Detection, ExtractError> {
        let content = self
            .structured_completion(
                DETECTION_SYSTEM_PROMPT,
                &with_caption(DETECTION_PROMPT, caption),
                "Detection",
                strict_schema::<Detection>(),
            )
            .await?;

        serde_json::from_str(&content)
            .map_err(|e| ExtractError::MalformedResponse(format!("detection payload: {}", e)))
    }

    /// Extract the full structured recipe from a caption.
    pub async fn extract(&self, caption: &str) -> Result<Recipe, ExtractError> {
        let content = self
            .structured_completion(
                EXTRACTION_SYSTEM_PROMPT,
                &with_caption(EXTRACTION_PROMPT, caption),
                "Recipe",
                strict_schema::<Recipe>(),
            )
            .await?;

        serde_json::from_str(&content)
            .map_err(|e| ExtractError::MalformedResponse(format!("recipe payload: {}", e)))
    }

    async fn structured_completion(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: Value,
    ) -> Result<String, ExtractError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "temperature": self.temperature,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user},
                ],
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": schema_name,
                        "schema": schema,
                        "strict": true,
                    },
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        debug!("completion response: {}", body);
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                ExtractError::MalformedResponse("completion has no message content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn post(pk: &str, caption: &str) -> Post {
        Post {
            pk: pk.to_string(),
            code: pk.to_string(),
            caption_text: caption.to_string(),
            title: None,
            thumbnail_url: None,
            taken_at: None,
        }
    }

    fn completion_body(content: &Value) -> String {
        json!({
            "choices": [{"message": {"content": content.to_string()}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_detect() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(&json!({
                "is_recipe": true,
                "confidence": 0.9,
                "reasoning": "lists ingredients and steps"
            })))
            .create_async()
            .await;

        let classifier = Classifier::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let detection = classifier.detect("2 eggs, mix, bake").await.unwrap();

        assert!(detection.is_recipe);
        assert!(detection.confidence > 0.8);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_low_confidence_yields_non_recipe_record() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(&json!({
                "is_recipe": true,
                "confidence": 0.1,
                "reasoning": "mentions food but no instructions"
            })))
            .expect(1)
            .create_async()
            .await;

        let classifier = Classifier::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let record = classifier
            .classify_post(&post("1", "nice dinner out"))
            .await
            .unwrap();

        assert!(!record.is_recipe);
        assert!(record.recipe.is_none());
        assert!((record.confidence - 0.1).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": "invalid api key"}"#)
            .create_async()
            .await;

        let classifier = Classifier::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let result = classifier.detect("caption").await;
        assert!(matches!(result, Err(ExtractError::ProviderError { .. })));
    }

    #[tokio::test]
    async fn test_classify_posts_skips_failures() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let classifier = Classifier::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let records = classifier
            .classify_posts(&[post("1", "soup"), post("2", "salad")])
            .await;
        assert!(records.is_empty());
    }
}
