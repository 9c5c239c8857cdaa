use std::collections::HashSet;

use log::info;
use serde_json::json;

use crate::model::{Post, Recipe};
use crate::prompts::{with_caption, EXTRACTION_PROMPT};
use crate::schema::strict_schema;

/// A line-delimited batch job description plus the correlation ids it emitted.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// JSONL content, one request object per line
    pub content: String,
    /// Correlation ids present in the manifest, unique within the job
    pub correlation_ids: HashSet<String>,
}

impl Manifest {
    pub fn is_empty(&self) -> bool {
        self.correlation_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.correlation_ids.len()
    }
}

/// Correlation id binding a request line to its originating post.
pub fn correlation_id(post: &Post) -> String {
    format!("recipe-{}", post.pk)
}

/// Builds JSONL manifests of per-post extraction requests.
pub struct ManifestBuilder {
    model: String,
}

impl ManifestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        ManifestBuilder {
            model: model.into(),
        }
    }

    /// Turn posts into one request line each.
    ///
    /// Posts with an empty or whitespace-only caption emit no line. Duplicate
    /// posts collapse to a single line so correlation ids stay unique within
    /// the job.
    pub fn build(&self, posts: &[Post]) -> Manifest {
        let schema = strict_schema::<Recipe>();
        let mut lines = Vec::new();
        let mut correlation_ids = HashSet::new();

        for post in posts {
            if post.caption_text.trim().is_empty() {
                continue;
            }
            let custom_id = correlation_id(post);
            if !correlation_ids.insert(custom_id.clone()) {
                continue;
            }

            let line = json!({
                "custom_id": custom_id,
                "method": "POST",
                "url": "/v1/responses",
                "body": {
                    "model": self.model,
                    "input": with_caption(EXTRACTION_PROMPT, &post.caption_text),
                    "text": {
                        "format": {
                            "type": "json_schema",
                            "name": "Recipe",
                            "schema": schema,
                            "strict": true,
                        },
                    },
                },
            });
            lines.push(line.to_string());
        }

        info!("Built manifest with {} request lines", lines.len());
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        Manifest {
            content,
            correlation_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_empty_captions_emit_no_line() {
        let builder = ManifestBuilder::new("gpt-4.1");
        let manifest = builder.build(&[
            post("1", "2 eggs, mix and bake"),
            post("2", ""),
            post("3", "   \n "),
        ]);

        assert_eq!(manifest.len(), 1);
        assert!(manifest.correlation_ids.contains("recipe-1"));
        assert_eq!(manifest.content.lines().count(), 1);
    }

    #[test]
    fn test_correlation_ids_unique_within_job() {
        let builder = ManifestBuilder::new("gpt-4.1");
        let duplicate = post("1", "pasta with garlic");
        let manifest = builder.build(&[duplicate.clone(), duplicate]);

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.content.lines().count(), 1);
    }

    #[test]
    fn test_lines_carry_model_and_strict_schema() {
        let builder = ManifestBuilder::new("gpt-4o-mini");
        let manifest = builder.build(&[post("7", "bake a cake")]);

        let line: serde_json::Value =
            serde_json::from_str(manifest.content.lines().next().unwrap()).unwrap();
        assert_eq!(line["custom_id"], "recipe-7");
        assert_eq!(line["method"], "POST");
        assert_eq!(line["url"], "/v1/responses");
        assert_eq!(line["body"]["model"], "gpt-4o-mini");
        assert_eq!(line["body"]["text"]["format"]["type"], "json_schema");
        assert_eq!(line["body"]["text"]["format"]["strict"], true);
        assert!(line["body"]["input"]
            .as_str()
            .unwrap()
            .contains("bake a cake"));
    }

    #[test]
    fn test_no_posts_yields_empty_manifest() {
        let builder = ManifestBuilder::new("gpt-4.1");
        let manifest = builder.build(&[]);
        assert!(manifest.is_empty());
        assert!(manifest.content.is_empty());
    }
}
