use std::env;
use std::process;

use log::error;

use recipegram::cost::{compare_modes, estimate, ProcessingMode};
use recipegram::{classify_collection, extract_collection, AppConfig, ExtractError};

const USAGE: &str = "Usage: recipegram <command> <collection_id> [limit]

Commands:
  extract   Submit cached posts as one batch job and reconcile the results
  classify  Classify cached posts one call at a time
  estimate  Print a batch-versus-live cost estimate

Posts must already be cached under the configured cache directory.";

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if let Err(e) = run(&args).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<(), ExtractError> {
    let command = args.get(1).map(String::as_str).unwrap_or("");
    let collection_id: i64 = match args.get(2).and_then(|s| s.parse().ok()) {
        Some(id) => id,
        None => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };
    let limit: usize = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(usize::MAX);

    let config = AppConfig::load()?;

    match command {
        "extract" => {
            let records = extract_collection(&config, collection_id, limit).await?;
            println!(
                "Extracted {} records ({} recipes)",
                records.len(),
                records.iter().filter(|r| r.is_recipe).count()
            );
        }
        "classify" => {
            let records = classify_collection(&config, collection_id, limit).await?;
            println!(
                "Classified {} posts ({} recipes)",
                records.len(),
                records.iter().filter(|r| r.is_recipe).count()
            );
        }
        "estimate" => {
            let cache = recipegram::CacheManager::new(&config.cache.dir)?;
            let count = cache
                .get_collection(collection_id)
                .map(|c| c.post_pks.len().min(limit))
                .unwrap_or(0);

            let batch = estimate(count, ProcessingMode::Batch);
            let live = estimate(count, ProcessingMode::Live);
            let summary = compare_modes(count);
            println!("Posts: {}", count);
            println!("Batch:  ${:.4}", batch.estimated_total_cost);
            println!("Live:   ${:.4}", live.estimated_total_cost);
            println!(
                "Batch saves ${:.4} ({:.1}%) but can take up to 24 hours",
                summary.savings_amount, summary.savings_percentage
            );
        }
        _ => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    }

    Ok(())
}
