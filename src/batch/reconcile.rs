use std::collections::HashMap;

use log::{info, warn};
use serde_json::Value;

use crate::batch::manifest::correlation_id;
use crate::model::{Post, Recipe, RecipeRecord};

/// Join a downloaded result stream back to the submitted posts.
///
/// Best-effort: lines that are blank, malformed, carry an unknown correlation
/// id, or fail schema validation are skipped with a warning. Total failure
/// yields an empty list, never an error, so callers must tolerate undercounts.
pub fn reconcile(posts: &[Post], output: &str) -> Vec<RecipeRecord> {
    let lookup: HashMap<String, &Post> = posts
        .iter()
        .map(|post| (correlation_id(post), post))
        .collect();

    let mut records = Vec::new();

    for (line_num, line) in output.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let envelope: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping malformed result line {}: {}", line_num + 1, e);
                continue;
            }
        };

        let custom_id = match envelope["custom_id"].as_str() {
            Some(id) => id,
            None => {
                warn!("Result line {} has no custom_id", line_num + 1);
                continue;
            }
        };

        let post = match lookup.get(custom_id) {
            Some(post) => *post,
            None => {
                warn!("Unknown custom_id: {}", custom_id);
                continue;
            }
        };

        let payload = match structured_payload(&envelope) {
            Some(text) => text,
            None => {
                warn!(
                    "Result line for {} has no structured payload",
                    custom_id
                );
                continue;
            }
        };

        let recipe: Recipe = match serde_json::from_str(payload) {
            Ok(recipe) => recipe,
            Err(e) => {
                warn!("Payload for {} failed schema validation: {}", custom_id, e);
                continue;
            }
        };

        records.push(RecipeRecord {
            post_pk: post.pk.clone(),
            code: post.code.clone(),
            caption: post.caption_text.clone(),
            is_recipe: true,
            confidence: 0.0,
            recipe: Some(recipe),
        });
    }

    info!("Reconciled {} records from result stream", records.len());
    records
}

/// The model's structured output, a JSON-encoded string nested in the
/// response envelope at `response.body.output[0].content[0].text`.
fn structured_payload(envelope: &Value) -> Option<&str> {
    envelope["response"]["body"]["output"][0]["content"][0]["text"].as_str()
}
