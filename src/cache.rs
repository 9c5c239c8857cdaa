use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::ExtractError;
use crate::model::{Collection, Post};

/// File-backed store for fetched posts and collection membership.
///
/// Layout: `<dir>/posts/<pk>.json` and `<dir>/collections/<id>.json`.
/// Corrupt cached JSON is treated as a miss, never an error.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Open (and create if needed) a cache rooted at `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, ExtractError> {
        let manager = CacheManager {
            cache_dir: cache_dir.into(),
        };
        fs::create_dir_all(manager.posts_dir())?;
        fs::create_dir_all(manager.collections_dir())?;
        Ok(manager)
    }

    fn posts_dir(&self) -> PathBuf {
        self.cache_dir.join("posts")
    }

    fn collections_dir(&self) -> PathBuf {
        self.cache_dir.join("collections")
    }

    /// Get a single cached post by pk.
    pub fn get_post(&self, pk: &str) -> Option<Post> {
        let path = self.posts_dir().join(format!("{}.json", pk));
        read_json(&path)
    }

    /// Save a single post to the cache.
    pub fn save_post(&self, post: &Post) -> Result<(), ExtractError> {
        let path = self.posts_dir().join(format!("{}.json", post.pk));
        fs::write(path, serde_json::to_string(post)?)?;
        Ok(())
    }

    /// Save multiple posts to the cache.
    pub fn save_posts(&self, posts: &[Post]) -> Result<(), ExtractError> {
        for post in posts {
            self.save_post(post)?;
        }
        Ok(())
    }

    /// Get a cached collection by id.
    pub fn get_collection(&self, collection_id: i64) -> Option<Collection> {
        let path = self.collections_dir().join(format!("{}.json", collection_id));
        read_json(&path)
    }

    /// Merge newly fetched posts into a collection and persist both.
    ///
    /// An existing collection is extended; otherwise a fresh one is created.
    pub fn save_collection(
        &self,
        collection_id: i64,
        posts: &[Post],
    ) -> Result<Collection, ExtractError> {
        let mut collection = self
            .get_collection(collection_id)
            .unwrap_or_else(|| Collection::new(collection_id));
        collection.append_posts(posts);

        let path = self.collections_dir().join(format!("{}.json", collection_id));
        fs::write(path, serde_json::to_string(&collection)?)?;

        self.save_posts(posts)?;
        Ok(collection)
    }

    /// Load every cached post named in a collection, skipping missing entries.
    pub fn collection_posts(&self, collection: &Collection) -> Vec<Post> {
        collection
            .post_pks
            .iter()
            .filter_map(|pk| {
                let post = self.get_post(pk);
                if post.is_none() {
                    warn!("Post {} listed in collection {} is not cached", pk, collection.id);
                }
                post
            })
            .collect()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        return None;
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Corrupt cache entry {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(pk: &str) -> Post {
        Post {
            pk: pk.to_string(),
            code: format!("code-{}", pk),
            caption_text: "2 eggs, 1 cup flour. Mix and bake.".to_string(),
            title: None,
            thumbnail_url: None,
            taken_at: None,
        }
    }

    #[test]
    fn test_post_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path()).unwrap();

        let post = sample_post("123");
        cache.save_post(&post).unwrap();
        assert_eq!(cache.get_post("123"), Some(post));
        assert!(cache.get_post("999").is_none());
    }

    #[test]
    fn test_corrupt_post_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path()).unwrap();

        fs::write(dir.path().join("posts/7.json"), "not json").unwrap();
        assert!(cache.get_post("7").is_none());
    }

    #[test]
    fn test_save_collection_merges_existing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path()).unwrap();

        cache
            .save_collection(42, &[sample_post("1"), sample_post("2")])
            .unwrap();
        let merged = cache.save_collection(42, &[sample_post("3")]).unwrap();

        assert_eq!(merged.post_pks, vec!["1", "2", "3"]);
        assert_eq!(merged.last_media_pk, 3);

        let reloaded = cache.get_collection(42).unwrap();
        assert_eq!(reloaded.post_pks.len(), 3);
    }

    #[test]
    fn test_collection_posts_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path()).unwrap();

        cache.save_collection(9, &[sample_post("1")]).unwrap();
        let mut collection = cache.get_collection(9).unwrap();
        collection.post_pks.push("missing".to_string());

        let posts = cache.collection_posts(&collection);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].pk, "1");
    }
}
