//! Pipeline
//!
//! Wires the visibility scheduler, state tracker, transcoder and caching
//! fetcher around one document. Work runs as detached tasks on a local
//! executor that the host drives with [`Pipeline::run_until_stalled`] or
//! [`Pipeline::run`].

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::future::Future;
use std::rc::Rc;

use sleek_device::{DeviceProfile, Environment};
use sleek_dom::{
    Document, ElementKind, MediaElement, NodeId, ProcessingState, Rect, Size, Stage, StateTracker,
};
use sleek_media::{Outcome, Transcoder, decoder};
use sleek_net::{
    CacheStats, CacheStore, CachingFetcher, Fetcher, LocalFuture, MemoryStorage, NetError, Request,
    Response, SystemClock,
};
use sleek_sched::{Registration, Strategy, Trigger, VisibilityScheduler, lazy};
use smol::LocalExecutor;

use crate::{Config, Error};

/// Completion callback: element, stage, terminal state
pub type Listener = Rc<dyn Fn(NodeId, Stage, ProcessingState)>;

/// State reachable from spawned tasks
struct Shared {
    document: RefCell<Document>,
    tracker: RefCell<StateTracker>,
    scheduler: RefCell<VisibilityScheduler>,
    viewport: Cell<Rect>,
    transcoder: Transcoder,
    fetcher: CachingFetcher<Box<dyn Fetcher>>,
    frame_hosts: Vec<String>,
    decode_before_reveal: bool,
    listener: RefCell<Option<Listener>>,
}

/// Resource optimization pipeline for one document
pub struct Pipeline {
    shared: Rc<Shared>,
    executor: LocalExecutor<'static>,
    config: Config,
}

impl Pipeline {
    /// Create a pipeline with in-memory cache storage and the system clock
    pub fn new(document: Document, env: &Environment, network: impl Fetcher + 'static, config: Config) -> Self {
        let store = CacheStore::with_config(MemoryStorage::default(), Rc::new(SystemClock), &config.cache);
        Self::with_store(document, DeviceProfile::detect(env), network, store, config)
    }

    /// Create a pipeline for a fresh document at `location`
    pub fn for_location(
        location: &str,
        env: &Environment,
        network: impl Fetcher + 'static,
        config: Config,
    ) -> Result<Self, Error> {
        Ok(Self::new(Document::new(location)?, env, network, config))
    }

    /// Create a pipeline from explicit parts
    pub fn with_store(
        document: Document,
        device: DeviceProfile,
        network: impl Fetcher + 'static,
        store: CacheStore,
        config: Config,
    ) -> Self {
        let network: Box<dyn Fetcher> = Box::new(network);
        let shared = Shared {
            document: RefCell::new(document),
            tracker: RefCell::new(StateTracker::new()),
            scheduler: RefCell::new(VisibilityScheduler::new(config.scheduler.clone())),
            viewport: Cell::new(Rect::default()),
            transcoder: Transcoder::new(device, config.transcode.clone()),
            fetcher: CachingFetcher::new(network, store, config.cache.policy.clone()),
            frame_hosts: config.scheduler.deferred_frame_hosts.clone(),
            decode_before_reveal: config.scheduler.decode_before_reveal,
            listener: RefCell::new(None),
        };
        tracing::info!(tier = %device.tier, webp = device.supports_webp, "sleek {} initialized", crate::VERSION);

        Self {
            shared: Rc::new(shared),
            executor: LocalExecutor::new(),
            config,
        }
    }

    /// Device snapshot taken at construction
    pub fn device(&self) -> &DeviceProfile {
        self.shared.transcoder.device()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> Ref<'_, Document> {
        self.shared.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.shared.document.borrow_mut()
    }

    /// Add an element to the document without processing it
    pub fn insert(&self, element: MediaElement) -> NodeId {
        self.shared.document.borrow_mut().insert(element)
    }

    pub fn viewport(&self) -> Rect {
        self.shared.viewport.get()
    }

    /// Set the viewport used for eager-zone decisions
    pub fn set_viewport(&self, viewport: Rect) {
        self.shared.viewport.set(viewport);
    }

    pub fn state(&self, id: NodeId, stage: Stage) -> ProcessingState {
        self.shared.tracker.borrow().state(id, stage)
    }

    /// Install the completion listener, replacing any previous one
    pub fn set_listener(&self, listener: impl Fn(NodeId, Stage, ProcessingState) + 'static) {
        *self.shared.listener.borrow_mut() = Some(Rc::new(listener));
    }

    // ========================================================================
    // Media processing
    // ========================================================================

    /// Compress or rasterize one element.
    ///
    /// Fire-and-forget: returns at once, the work runs on the executor. Calls
    /// for an element whose stage already started are no-ops.
    pub fn process_media_resource(&self, id: NodeId) {
        if let Some(task) = self.shared.start_media(id) {
            self.spawn(task);
        }
    }

    /// Process every image in the document
    pub fn process_all(&self) {
        let ids = self.image_ids();
        tracing::debug!(count = ids.len(), "processing document");
        for id in ids {
            self.process_media_resource(id);
        }
    }

    /// Host reports that an element finished loading its source
    pub fn on_resource_loaded(&self, id: NodeId, payload: Vec<u8>, size: Size) {
        {
            let mut doc = self.shared.document.borrow_mut();
            let Some(element) = doc.get_mut(id) else {
                tracing::debug!(node = %id, "load for unknown element");
                return;
            };
            if element.is_deferred() {
                tracing::debug!(node = %id, "placeholder load ignored");
                return;
            }
            element.payload = Some(payload);
            element.intrinsic = Some(size);
            element.visually_ready = true;
        }
        self.process_media_resource(id);
    }

    /// Host reports inserted elements
    pub fn on_nodes_added(&self, ids: &[NodeId]) {
        for &id in ids {
            self.process_media_resource(id);
        }
    }

    /// Host reports removed elements; their markers and registrations go too
    pub fn on_nodes_removed(&self, ids: &[NodeId]) {
        let mut doc = self.shared.document.borrow_mut();
        let mut tracker = self.shared.tracker.borrow_mut();
        let mut scheduler = self.shared.scheduler.borrow_mut();

        for &id in ids {
            doc.remove(id);
            tracker.release(id);
            scheduler.unobserve(id);
        }
        let swept = tracker.retain_live(&doc);
        if swept > 0 {
            tracing::debug!(swept, "released stale markers");
        }
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Register an element for a visibility strategy.
    ///
    /// Elements already inside the eager zone are acted on at once. Deferred
    /// `Reveal` registrations swap in a placeholder. Returns None for
    /// unknown elements and for a `Reveal` that has already started.
    pub fn observe_for_lazy_load(&self, id: NodeId, strategy: Strategy) -> Option<Registration> {
        let bounds = self.shared.document.borrow().get(id)?.bounds;
        if strategy == Strategy::Reveal && self.state(id, Stage::Reveal) != ProcessingState::Unprocessed {
            tracing::debug!(node = %id, "already revealed");
            return None;
        }
        let viewport = self.shared.viewport.get();
        let registration = self.shared.scheduler.borrow_mut().observe(id, strategy, &bounds, &viewport);

        match registration {
            Registration::Immediate => self.dispatch(Trigger { id, strategy }),
            Registration::Deferred if strategy == Strategy::Reveal => {
                let mut doc = self.shared.document.borrow_mut();
                if let Some(element) = doc.get_mut(id) {
                    if lazy::defer(element, &self.shared.frame_hosts) {
                        tracing::debug!(node = %id, "source deferred");
                    }
                }
            }
            Registration::Deferred => {}
        }
        Some(registration)
    }

    /// Lazy-load every deferrable image and embed in the document.
    ///
    /// Returns how many were registered.
    pub fn lazy_load_all(&self) -> usize {
        let ids: Vec<NodeId> = {
            let doc = self.shared.document.borrow();
            doc.iter()
                .filter(|(_, el)| !el.src.is_empty() && !el.is_inline())
                .filter(|(_, el)| match el.kind {
                    ElementKind::Image => true,
                    ElementKind::Frame => lazy::is_deferred_embed(&el.src, &self.shared.frame_hosts),
                })
                .map(|(id, _)| id)
                .collect()
        };
        ids.into_iter()
            .filter(|&id| self.observe_for_lazy_load(id, Strategy::Reveal).is_some())
            .count()
    }

    /// Host reports a new viewport and the current element boxes
    pub fn on_viewport_change(&self, viewport: Rect, boxes: &[(NodeId, Rect)]) {
        self.shared.viewport.set(viewport);
        {
            let mut doc = self.shared.document.borrow_mut();
            for (id, bounds) in boxes {
                if let Some(element) = doc.get_mut(*id) {
                    element.bounds = *bounds;
                }
            }
        }

        let triggers = self.shared.scheduler.borrow_mut().check(&viewport, boxes);
        for trigger in triggers {
            self.dispatch(trigger);
        }
    }

    fn dispatch(&self, trigger: Trigger) {
        tracing::debug!(node = %trigger.id, strategy = ?trigger.strategy, "visibility trigger");
        let task = match trigger.strategy {
            Strategy::Reveal => self.shared.start_reveal(trigger.id),
            Strategy::Prefetch => self.shared.start_prefetch(trigger.id),
            Strategy::Transcode => self.shared.start_media(trigger.id),
        };
        if let Some(task) = task {
            self.spawn(task);
        }
    }

    // ========================================================================
    // Cache
    // ========================================================================

    /// Send a request through the response cache
    pub async fn cache_intercept(&self, request: &Request) -> Result<Response, NetError> {
        self.shared.fetcher.fetch(request).await
    }

    /// Caching fetcher shared by every pipeline request
    pub fn fetcher(&self) -> &dyn Fetcher {
        &self.shared.fetcher
    }

    /// Drop every cached response
    pub fn clear_cache(&self) -> usize {
        self.shared.fetcher.clear()
    }

    /// Drop expired cached responses
    pub fn cleanup_cache(&self) -> usize {
        self.shared.fetcher.cleanup()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.shared.fetcher.stats()
    }

    // ========================================================================
    // Executor
    // ========================================================================

    /// Run ready tasks until none can make progress; returns the tick count
    pub fn run_until_stalled(&self) -> usize {
        let mut ticks = 0;
        while self.executor.try_tick() {
            ticks += 1;
        }
        ticks
    }

    /// Drive pipeline tasks while awaiting `future`
    pub async fn run<T>(&self, future: impl Future<Output = T>) -> T {
        self.executor.run(future).await
    }

    /// No task is queued or in flight
    pub fn is_idle(&self) -> bool {
        self.executor.is_empty()
    }

    fn spawn(&self, task: LocalFuture<'static, ()>) {
        self.executor.spawn(task).detach();
    }

    fn image_ids(&self) -> Vec<NodeId> {
        self.shared
            .document
            .borrow()
            .iter()
            .filter(|(_, el)| el.kind == ElementKind::Image)
            .map(|(id, _)| id)
            .collect()
    }
}

impl Shared {
    /// Claim the media stage for `id` and return its work.
    ///
    /// The claim happens here, before anything awaits.
    fn start_media(self: &Rc<Self>, id: NodeId) -> Option<LocalFuture<'static, ()>> {
        let (stage, snapshot) = {
            let doc = self.document.borrow();
            let Some(element) = doc.get(id) else {
                tracing::debug!(node = %id, "unknown element");
                return None;
            };
            if element.kind != ElementKind::Image || element.is_deferred() {
                return None;
            }
            // Committed output is final; a rasterized vector reads as a loaded raster
            if element.output_encoding.is_some() {
                return None;
            }
            if element.is_vector() {
                (Stage::Vector, Some(element.clone()))
            } else if element.is_loaded() {
                (Stage::Raster, None)
            } else {
                tracing::debug!(node = %id, "waiting for load");
                return None;
            }
        };

        if !self.tracker.borrow_mut().try_begin(id, stage) {
            return None;
        }

        let shared = Rc::clone(self);
        let task: LocalFuture<'static, ()> = match snapshot {
            Some(element) => Box::pin(shared.rasterize(id, element)),
            None => Box::pin(async move { shared.compress(id) }),
        };
        Some(task)
    }

    fn compress(&self, id: NodeId) {
        let state = match self.document.borrow_mut().get_mut(id) {
            Some(element) => match self.transcoder.compress_raster(element) {
                Ok(Outcome::Deferred) => {
                    tracing::warn!(node = %id, "source unloaded before compression");
                    ProcessingState::Failed
                }
                Ok(outcome) => {
                    tracing::debug!(node = %id, ?outcome, "raster pass done");
                    ProcessingState::Processed
                }
                Err(e) => {
                    tracing::warn!(node = %id, error = %e, "raster compression failed");
                    ProcessingState::Failed
                }
            },
            None => {
                tracing::debug!(node = %id, "element removed before compression");
                ProcessingState::Failed
            }
        };
        self.settle(id, Stage::Raster, state);
    }

    async fn rasterize(self: Rc<Self>, id: NodeId, element: MediaElement) {
        let location = self.document.borrow().location().cloned();
        let result = self
            .transcoder
            .rasterize_element(&element, location.as_ref(), &self.fetcher)
            .await;

        let state = match result {
            Ok(Some(raster)) => {
                let mut doc = self.document.borrow_mut();
                match doc.get_mut(id) {
                    Some(target) if target.src == element.src => {
                        tracing::debug!(node = %id, width = raster.width, height = raster.height, "vector committed");
                        self.transcoder.commit_vector(target, raster);
                        ProcessingState::Processed
                    }
                    Some(_) => {
                        tracing::debug!(node = %id, "source changed during rasterization");
                        ProcessingState::Processed
                    }
                    None => ProcessingState::Failed,
                }
            }
            Ok(None) => ProcessingState::Processed,
            Err(e) => {
                tracing::warn!(node = %id, error = %e, "vector rasterization failed");
                ProcessingState::Failed
            }
        };
        self.settle(id, Stage::Vector, state);
    }

    /// Restore a deferred source and hand off to the media stage
    fn start_reveal(self: &Rc<Self>, id: NodeId) -> Option<LocalFuture<'static, ()>> {
        if !self.document.borrow().contains(id) {
            return None;
        }
        if !self.tracker.borrow_mut().try_begin(id, Stage::Reveal) {
            return None;
        }

        let decode_src = {
            let mut doc = self.document.borrow_mut();
            let element = doc.get_mut(id)?;
            let restored = lazy::restore(element);
            let decode = self.decode_before_reveal
                && restored
                && element.kind == ElementKind::Image
                && !element.is_vector()
                && !element.is_inline();
            if !decode {
                element.visually_ready = true;
            }
            decode.then(|| element.src.clone())
        };

        match decode_src {
            Some(src) => {
                let shared = Rc::clone(self);
                Some(Box::pin(shared.decode_and_reveal(id, src)))
            }
            None => {
                self.settle(id, Stage::Reveal, ProcessingState::Processed);
                self.start_media(id)
            }
        }
    }

    async fn decode_and_reveal(self: Rc<Self>, id: NodeId, src: String) {
        let url = absolute_url(&self.document.borrow(), &src);
        let request = Request::get(&url);

        let loaded = match self.fetcher.fetch(&request).await {
            Ok(response) if response.ok() => match decoder::decode(&response.body) {
                Ok(image) => Ok((response.body, image.dimensions())),
                Err(e) => Err(Error::from(e)),
            },
            Ok(response) => Err(Error::from(NetError::HttpError { status: response.status })),
            Err(e) => Err(Error::from(e)),
        };

        let state = {
            let mut doc = self.document.borrow_mut();
            match (doc.get_mut(id), loaded) {
                (Some(element), Ok((payload, (width, height)))) => {
                    element.payload = Some(payload);
                    element.intrinsic = Some(Size::new(width as f64, height as f64));
                    element.visually_ready = true;
                    ProcessingState::Processed
                }
                (Some(element), Err(e)) => {
                    tracing::warn!(node = %id, %url, error = %e, "decode before reveal failed");
                    element.visually_ready = true;
                    ProcessingState::Failed
                }
                (None, _) => ProcessingState::Failed,
            }
        };
        self.settle(id, Stage::Reveal, state);

        if state == ProcessingState::Processed {
            if let Some(task) = self.start_media(id) {
                task.await;
            }
        }
    }

    /// Warm the cache with the element's true source
    fn start_prefetch(self: &Rc<Self>, id: NodeId) -> Option<LocalFuture<'static, ()>> {
        let url = {
            let doc = self.document.borrow();
            let element = doc.get(id)?;
            let src = element.lazy_src.as_deref().unwrap_or(&element.src);
            if src.is_empty() || src.starts_with("data:") {
                return None;
            }
            absolute_url(&doc, src)
        };

        let shared = Rc::clone(self);
        Some(Box::pin(async move {
            let request = Request::get(&url);
            match shared.fetcher.fetch(&request).await {
                Ok(response) => {
                    tracing::debug!(%url, status = response.status, cached = response.from_cache, "prefetched")
                }
                Err(e) => tracing::warn!(%url, error = %e, "prefetch failed"),
            }
        }))
    }

    /// Record a terminal state and notify the listener once
    fn settle(&self, id: NodeId, stage: Stage, state: ProcessingState) {
        let live = self.document.borrow().contains(id);
        if live && !self.tracker.borrow_mut().finish(id, stage, state) {
            return;
        }
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(id, stage, state);
        }
    }
}

/// Resolve `src` against the document location when it has one
fn absolute_url(doc: &Document, src: &str) -> String {
    doc.location()
        .and_then(|base| base.join(src).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| src.to_string())
}
