//! Catalog-backed resolver
//!
//! Stands in for a media site: searches match titles by case-insensitive
//! substring, and a pasted page link matches its entry exactly.

use crate::config::CatalogEntry;
use async_trait::async_trait;
use chorus_core::{ChorusError, ResolvedAudio, Resolver, SearchResult};
use std::time::Duration;
use tracing::debug;

pub struct CatalogResolver {
    entries: Vec<CatalogEntry>,
}

impl CatalogResolver {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn to_result(index: usize, entry: &CatalogEntry) -> SearchResult {
        SearchResult {
            id: format!("c{}", index),
            title: entry.title.clone(),
            duration: Duration::from_secs(entry.duration_secs),
            origin_url: entry.url.clone(),
            thumbnail_url: entry.thumbnail_url.clone(),
        }
    }
}

#[async_trait]
impl Resolver for CatalogResolver {
    async fn search(&self, query: &str, limit: usize) -> chorus_core::Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let needle = query.to_lowercase();
        let results: Vec<_> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.url == query || e.title.to_lowercase().contains(&needle))
            .take(limit)
            .map(|(i, e)| Self::to_result(i, e))
            .collect();

        debug!(query, found = results.len(), "Catalog search");
        Ok(results)
    }

    async fn resolve_audio(&self, origin_url: &str) -> chorus_core::Result<ResolvedAudio> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.url == origin_url)
            .ok_or_else(|| ChorusError::resolver(format!("no catalog entry for {}", origin_url)))?;

        Ok(ResolvedAudio {
            title: entry.title.clone(),
            duration: Duration::from_secs(entry.duration_secs),
            origin_url: entry.url.clone(),
            thumbnail_url: entry.thumbnail_url.clone(),
            source_uri: entry.audio_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;

    fn resolver() -> CatalogResolver {
        CatalogResolver::new(ConsoleConfig::default().catalog)
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let results = resolver().search("NIGHT", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Night Drive");
    }

    #[tokio::test]
    async fn search_honours_limit() {
        // "o" appears in most default titles
        let results = resolver().search("o", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn blank_query_finds_nothing() {
        assert!(resolver().search("   ", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pasted_link_matches_exactly() {
        let resolver = resolver();
        let url = resolver.entries()[2].url.clone();

        let results = resolver.search(&url, 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].origin_url, url);
    }

    #[tokio::test]
    async fn resolves_known_urls_only() {
        let resolver = resolver();
        let entry = resolver.entries()[0].clone();

        let audio = resolver.resolve_audio(&entry.url).await.unwrap();
        assert_eq!(audio.source_uri, entry.audio_url);
        assert_eq!(audio.duration, Duration::from_secs(entry.duration_secs));

        let err = resolver
            .resolve_audio("https://elsewhere.example.com/x")
            .await
            .unwrap_err();
        assert!(matches!(err, ChorusError::Resolver(_)));
    }
}
