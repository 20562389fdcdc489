//! In-memory doubles for the catalog, the store and the media source
//!
//! They implement the public traits so the pipeline and the verifier run
//! unchanged against them.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use video_migrator::app::{
    ByteStream, MediaSource, ObjectStore, ProgressEvent, ProgressReporter, SourceStream,
    StorageKey, VideoCatalog, VideoRecord,
};
use video_migrator::constants::PAGE_SIZE;
use video_migrator::errors::{
    CatalogError, CatalogResult, HttpError, StoreError, StoreResult, TransferError,
    TransferResult,
};

/// Catalog backed by a list of fully resolved records
pub struct MemoryCatalog {
    records: Vec<VideoRecord>,
    failing_details: HashSet<String>,
    pub page_requests: AtomicUsize,
    pub detail_requests: AtomicUsize,
}

impl MemoryCatalog {
    pub fn new(records: Vec<VideoRecord>) -> Self {
        Self {
            records,
            failing_details: HashSet::new(),
            page_requests: AtomicUsize::new(0),
            detail_requests: AtomicUsize::new(0),
        }
    }

    /// Detail fetches for `video_id` fail with HTTP 500
    pub fn fail_detail(mut self, video_id: &str) -> Self {
        self.failing_details.insert(video_id.to_string());
        self
    }

    /// Listing-shaped records, without source URLs
    pub fn listed(&self) -> Vec<VideoRecord> {
        self.records
            .iter()
            .map(|r| VideoRecord::new(r.video_id.clone(), r.title.clone()))
            .collect()
    }
}

#[async_trait]
impl VideoCatalog for MemoryCatalog {
    async fn list_page(&self, page: u32) -> CatalogResult<Vec<VideoRecord>> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let start = (page as usize - 1) * PAGE_SIZE;
        Ok(self
            .listed()
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .collect())
    }

    async fn get_detail(&self, video_id: &str) -> CatalogResult<VideoRecord> {
        self.detail_requests.fetch_add(1, Ordering::SeqCst);
        let not_found = || CatalogError::Detail {
            video_id: video_id.to_string(),
            source: HttpError::Status { status: 404 },
        };

        if self.failing_details.contains(video_id) {
            return Err(CatalogError::Detail {
                video_id: video_id.to_string(),
                source: HttpError::Status { status: 500 },
            });
        }

        self.records
            .iter()
            .find(|r| r.video_id == video_id)
            .cloned()
            .ok_or_else(not_found)
    }
}

/// Bucket held in a map
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    pub puts: AtomicUsize,
    pub exists_checks: AtomicUsize,
    pub fail_puts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: &[&str]) -> Self {
        let store = Self::new();
        for key in keys {
            store.insert(key, b"existing");
        }
        store
    }

    pub fn insert(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body.to_vec());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &StorageKey) -> bool {
        self.exists_checks.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().contains_key(key.as_str())
    }

    async fn put_stream(
        &self,
        key: &StorageKey,
        mut body: ByteStream,
        _size_hint: Option<u64>,
    ) -> TransferResult<u64> {
        self.puts.fetch_add(1, Ordering::SeqCst);

        let mut buffer = Vec::new();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Commit {
                key: key.to_string(),
                reason: "simulated commit failure".to_string(),
            }
            .into());
        }

        let len = buffer.len() as u64;
        self.insert(key.as_str(), &buffer);
        Ok(len)
    }

    async fn list_keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

/// Source serving fixed payloads per URL
#[derive(Default)]
pub struct MemorySource {
    payloads: HashMap<String, Vec<u8>>,
    failing_urls: HashSet<String>,
    fail_first: AtomicUsize,
    pub opens: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, url: &str, payload: &[u8]) -> Self {
        self.payloads.insert(url.to_string(), payload.to_vec());
        self
    }

    /// Every open of `url` answers HTTP 503
    pub fn always_fail(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    /// The next `count` opens answer HTTP 503, whatever the URL
    pub fn fail_first(self, count: usize) -> Self {
        self.fail_first.store(count, Ordering::SeqCst);
        self
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for MemorySource {
    async fn open(&self, url: &str) -> TransferResult<SourceStream> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        let transient = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if transient || self.failing_urls.contains(url) {
            return Err(TransferError::SourceStatus {
                status: 503,
                url: url.to_string(),
            });
        }

        let payload = self.payloads.get(url).cloned().unwrap_or_default();
        let content_length = Some(payload.len() as u64);
        let chunks: Vec<TransferResult<Bytes>> = payload
            .chunks(4)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();

        Ok(SourceStream {
            body: futures::stream::iter(chunks).boxed(),
            content_length,
        })
    }
}

/// Reporter that keeps every event
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingReporter {
    pub fn retries(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Retrying { .. }))
            .count()
    }

    pub fn finished(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::ItemFinished { .. }))
            .count()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Record with a source URL derived from its identifier
pub fn video(video_id: &str, title: &str) -> VideoRecord {
    VideoRecord::new(video_id, title).with_source(source_url(video_id))
}

pub fn source_url(video_id: &str) -> String {
    format!("https://cdn.example.com/{}.mp4", video_id)
}
