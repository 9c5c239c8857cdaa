use async_trait::async_trait;
use log::info;

use crate::cache::CacheManager;
use crate::error::ExtractError;
use crate::model::{Collection, Post};

/// Supplier of caption-bearing posts for one saved collection.
///
/// Implementations own authentication and pagination against the social-media
/// API; this crate only consumes the resulting post records.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch up to `limit` posts, resuming after `last_media_pk` when non-zero.
    async fn fetch_collection_posts(
        &self,
        collection_id: i64,
        limit: usize,
        last_media_pk: u64,
    ) -> Result<Vec<Post>, ExtractError>;
}

/// Load a collection from the cache, or page it in from the source.
///
/// Each fetched page is persisted before the next request so an interrupted
/// run resumes from the collection's high-water mark.
pub async fn load_or_fetch_collection(
    source: &dyn PostSource,
    cache: &CacheManager,
    collection_id: i64,
    limit: usize,
) -> Result<Collection, ExtractError> {
    if let Some(collection) = cache.get_collection(collection_id) {
        info!("Loaded collection {} from cache", collection_id);
        return Ok(collection);
    }

    info!("Fetching up to {} posts for collection {}", limit, collection_id);
    let mut collection = Collection::new(collection_id);
    let mut fetched = 0;

    while fetched < limit {
        let page_limit = (limit - fetched).min(1000);
        let page = source
            .fetch_collection_posts(collection_id, page_limit, collection.last_media_pk)
            .await?;
        if page.is_empty() {
            break;
        }
        fetched += page.len();
        collection = cache.save_collection(collection_id, &page)?;
    }

    info!(
        "Fetched {} posts for collection {}",
        collection.post_pks.len(),
        collection_id
    );
    Ok(collection)
}
