pub mod analysis;
pub mod batch;
pub mod cache;
pub mod classify;
pub mod config;
pub mod cost;
pub mod error;
pub mod model;
pub mod prompts;
pub mod schema;
pub mod source;

use log::info;

pub use crate::batch::{BatchClient, ManifestBuilder};
pub use crate::cache::CacheManager;
pub use crate::classify::Classifier;
pub use crate::config::AppConfig;
pub use crate::error::ExtractError;
pub use crate::model::{Collection, JobStatus, Post, Recipe, RecipeRecord};
pub use crate::source::PostSource;

/// Run the batch extraction workflow over every cached post of a collection
/// and persist the analysis artifact.
pub async fn extract_collection(
    config: &AppConfig,
    collection_id: i64,
    limit: usize,
) -> Result<Vec<RecipeRecord>, ExtractError> {
    let cache = CacheManager::new(&config.cache.dir)?;
    let posts = cached_posts(&cache, collection_id, limit)?;
    info!("Extracting recipes from {} posts", posts.len());

    let client = BatchClient::new(&config.provider)?;
    let records = batch::extract_posts(&client, &config.batch, &config.provider.model, &posts).await?;

    analysis::save_analysis(
        &records,
        &config.provider.model,
        &config.batch.data_dir.join("analyzed_recipes.json"),
    )?;
    Ok(records)
}

/// Classify every cached post of a collection with per-post live calls.
pub async fn classify_collection(
    config: &AppConfig,
    collection_id: i64,
    limit: usize,
) -> Result<Vec<RecipeRecord>, ExtractError> {
    let cache = CacheManager::new(&config.cache.dir)?;
    let posts = cached_posts(&cache, collection_id, limit)?;
    info!("Classifying {} posts", posts.len());

    let classifier = Classifier::new(&config.provider, &config.classify)?;
    let records = classifier.classify_posts(&posts).await;

    analysis::save_analysis(
        &records,
        &config.provider.model,
        &config.batch.data_dir.join("analyzed_recipes.json"),
    )?;
    Ok(records)
}

/// Fetch a collection through a post source, populating the cache.
pub async fn fetch_collection(
    config: &AppConfig,
    source: &dyn PostSource,
    collection_id: i64,
    limit: usize,
) -> Result<Collection, ExtractError> {
    let cache = CacheManager::new(&config.cache.dir)?;
    source::load_or_fetch_collection(source, &cache, collection_id, limit).await
}

fn cached_posts(
    cache: &CacheManager,
    collection_id: i64,
    limit: usize,
) -> Result<Vec<Post>, ExtractError> {
    let collection = cache.get_collection(collection_id).ok_or_else(|| {
        ExtractError::SourceError(format!(
            "collection {} is not cached; run fetch first",
            collection_id
        ))
    })?;

    let mut posts = cache.collection_posts(&collection);
    posts.truncate(limit);
    Ok(posts)
}
