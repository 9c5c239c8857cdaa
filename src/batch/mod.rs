mod client;
mod manifest;
mod poller;
mod reconcile;

pub use client::BatchClient;
pub use manifest::{correlation_id, Manifest, ManifestBuilder};
pub use poller::wait_for_completion;
pub use reconcile::reconcile;

use std::fs;
use std::time::Duration;

use log::{info, warn};

use crate::config::BatchConfig;
use crate::error::ExtractError;
use crate::model::{JobStatus, Post, RecipeRecord};

/// Run the full batch extraction workflow over a set of posts.
///
/// Builds the manifest, submits the job, polls until a terminal state,
/// downloads both streams into the data directory, and reconciles the output
/// back to the posts. A terminal `failed`/`cancelled`/`expired` status is the
/// one error this stage propagates.
pub async fn extract_posts(
    client: &BatchClient,
    config: &BatchConfig,
    model: &str,
    posts: &[Post],
) -> Result<Vec<RecipeRecord>, ExtractError> {
    let manifest = ManifestBuilder::new(model).build(posts);
    if manifest.is_empty() {
        warn!("No posts with captions to submit, skipping batch");
        return Ok(Vec::new());
    }

    fs::create_dir_all(&config.data_dir)?;
    fs::write(config.data_dir.join("tasks.jsonl"), &manifest.content)?;

    let file_id = client.upload_manifest(manifest.content.clone()).await?;
    let job = client.create_job(&file_id).await?;
    info!("Submitted batch job {} with {} requests", job.id, manifest.len());

    let interval = Duration::from_secs(config.clamped_poll_interval());
    let job = wait_for_completion(client, &job.id, interval).await?;

    if let Some(error_file_id) = &job.error_file_id {
        let errors = client.download_file(error_file_id).await?;
        fs::write(config.data_dir.join("errors.jsonl"), &errors)?;
        info!("Downloaded error stream to {}", config.data_dir.join("errors.jsonl").display());
    }

    if job.status != JobStatus::Completed {
        return Err(ExtractError::JobFailed {
            batch_id: job.id,
            status: job.status.as_str().to_string(),
        });
    }

    let output = match &job.output_file_id {
        Some(output_file_id) => {
            let output = client.download_file(output_file_id).await?;
            fs::write(config.data_dir.join("results.jsonl"), &output)?;
            output
        }
        None => {
            warn!("Completed batch {} has no output file", job.id);
            String::new()
        }
    };

    Ok(reconcile(posts, &output))
}
