use std::time::{Duration, Instant};

use log::info;

use crate::batch::client::BatchClient;
use crate::error::ExtractError;
use crate::model::BatchJob;

/// Poll a batch job at a fixed interval until it reaches a terminal state.
///
/// Returns the job whatever its terminal status is; mapping failure states to
/// an error is the caller's decision. There is no cancellation and no backoff.
pub async fn wait_for_completion(
    client: &BatchClient,
    batch_id: &str,
    poll_interval: Duration,
) -> Result<BatchJob, ExtractError> {
    info!("Waiting for batch {}...", batch_id);
    let start = Instant::now();

    loop {
        let job = client.retrieve_job(batch_id).await?;

        if let Some(counts) = job.request_counts {
            if counts.total > 0 {
                let progress = (counts.completed as f64 / counts.total as f64) * 100.0;
                info!(
                    "Progress: {}/{} ({:.1}%) - {:.0}s elapsed",
                    counts.completed,
                    counts.total,
                    progress,
                    start.elapsed().as_secs_f64()
                );
            }
        }

        if job.status.is_terminal() {
            info!(
                "Batch {} {} after {:.1}s",
                batch_id,
                job.status.as_str(),
                start.elapsed().as_secs_f64()
            );
            return Ok(job);
        }

        info!("Batch {} status: {}", batch_id, job.status.as_str());
        tokio::time::sleep(poll_interval).await;
    }
}
