use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, TimeZone, Utc};
use futures::{Stream, StreamExt, stream};
use shop_assistant::{
    Error, Result,
    catalog::{CatalogQuery, Pagination, Product, ProductPage},
    chat::{ChatEvent, ClientGone, EventSink},
    llm::{ByteStream, GenerateRequest, GenerationBackend},
};
use std::{
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};

pub fn product(id: i64, name: &str, category: &str, price: f64) -> Product {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(id);
    Product {
        id,
        thumbnail: String::new(),
        category: category.to_string(),
        name: name.to_string(),
        price,
        image_link: String::new(),
        created_at,
        updated_at: created_at,
    }
}

/// Catalog backed by a fixed product list, newest first.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    pub products: Vec<Product>,
    pub fail_with: Option<String>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            fail_with: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            products: Vec::new(),
            fail_with: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl CatalogQuery for InMemoryCatalog {
    async fn fetch(&self, page: u32, page_size: u32) -> Result<ProductPage> {
        if let Some(message) = &self.fail_with {
            return Err(Error::internal(message.clone()));
        }
        let page = page.max(1);
        let offset = ((page - 1) * page_size) as usize;
        let products = self
            .products
            .iter()
            .skip(offset)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(ProductPage {
            products,
            pagination: Pagination::new(page, page_size, self.products.len() as u64),
        })
    }

    async fn list_distinct_categories(&self) -> Result<Vec<String>> {
        if let Some(message) = &self.fail_with {
            return Err(Error::internal(message.clone()));
        }
        let mut categories: Vec<String> =
            self.products.iter().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}

/// One scripted element of a backend body.
#[derive(Debug, Clone)]
pub enum Chunk {
    Raw(String),
    Fail(String),
}

impl Chunk {
    pub fn fragment(text: &str) -> Self {
        Chunk::Raw(format!(
            "{}\n",
            serde_json::json!({ "response": text, "done": false })
        ))
    }

    pub fn done() -> Self {
        Chunk::Raw("{\"response\":\"\",\"done\":true}\n".to_string())
    }
}

/// Backend that replays a fixed body and records every request it gets.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    pub chunks: Vec<Chunk>,
    pub open_error: Option<String>,
    pub requests: Mutex<Vec<GenerateRequest>>,
    pub released: Arc<AtomicBool>,
}

impl ScriptedBackend {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            ..Default::default()
        }
    }

    pub fn fragments(texts: &[&str]) -> Self {
        let mut chunks: Vec<Chunk> = texts.iter().map(|t| Chunk::fragment(t)).collect();
        chunks.push(Chunk::done());
        Self::new(chunks)
    }

    pub fn unreachable(message: &str) -> Self {
        Self {
            open_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn was_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn open_stream(&self, request: &GenerateRequest) -> Result<ByteStream> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.open_error {
            return Err(Error::backend(message.clone()));
        }
        Ok(tracked(script_stream(&self.chunks), self.released.clone()).boxed())
    }
}

pub fn script_stream(chunks: &[Chunk]) -> impl Stream<Item = Result<Bytes>> + Send + Unpin + 'static {
    let items: Vec<Result<Bytes>> = chunks
        .iter()
        .map(|chunk| match chunk {
            Chunk::Raw(text) => Ok(Bytes::from(text.clone())),
            Chunk::Fail(message) => Err(Error::backend_stream(message.clone())),
        })
        .collect();
    stream::iter(items)
}

/// Wraps a stream and raises `released` once it is dropped.
pub struct TrackedStream<S> {
    inner: S,
    released: Arc<AtomicBool>,
}

pub fn tracked<S>(inner: S, released: Arc<AtomicBool>) -> TrackedStream<S> {
    TrackedStream { inner, released }
}

impl<S: Stream + Unpin> Stream for TrackedStream<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<S> Drop for TrackedStream<S> {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Sink that records events and can report a disconnect after a given
/// number of liveness checks.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<ChatEvent>>,
    close_after_checks: Option<usize>,
    checks: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closing_after(checks: usize) -> Self {
        Self {
            close_after_checks: Some(checks),
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ChatEvent::Message(text) => Some(text),
                ChatEvent::Error(_) => None,
            })
            .collect()
    }

    fn closed(&self) -> bool {
        self.close_after_checks
            .is_some_and(|limit| self.checks.load(Ordering::SeqCst) >= limit)
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: ChatEvent) -> std::result::Result<(), ClientGone> {
        if self.closed() {
            return Err(ClientGone);
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        let closed = self.closed();
        self.checks.fetch_add(1, Ordering::SeqCst);
        closed
    }
}
