use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, Semaphore};

use crate::filter::{ChainRequest, FilterChainApplier, FilterInput, FilterKind, FilterRegistry, FilterSnapshot};
use crate::log::{FilteredView, LogDataset};

/// Receives the full filter state after every successful mutation
pub trait Presenter {
    fn refresh_display(&mut self, snapshot: &FilterSnapshot, view: &FilteredView);
}

/// Runs recomputations off the calling task, one at a time.
///
/// A request arriving while another is in flight waits for the slot, so the
/// dataset never reflects a mix of filter generations. The slot is released
/// only when the blocking recomputation finishes, even if the caller stops
/// waiting for it.
pub struct RecomputeWorker<D> {
    dataset: Arc<Mutex<D>>,
    slot: Arc<Semaphore>,
}

impl<D> Clone for RecomputeWorker<D> {
    fn clone(&self) -> Self {
        Self {
            dataset: Arc::clone(&self.dataset),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<D: LogDataset + Send + 'static> RecomputeWorker<D> {
    pub fn new(dataset: D) -> Self {
        Self {
            dataset: Arc::new(Mutex::new(dataset)),
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn dataset(&self) -> Arc<Mutex<D>> {
        Arc::clone(&self.dataset)
    }

    /// True while a recomputation holds the slot
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    pub async fn run(&self, request: ChainRequest) -> Result<FilteredView> {
        let permit = Arc::clone(&self.slot).acquire_owned().await?;
        let dataset = Arc::clone(&self.dataset);
        let view = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let mut dataset = dataset.blocking_lock();
            FilterChainApplier::apply(&mut *dataset, &request)
        })
        .await?;
        Ok(view)
    }
}

/// Filter state, dataset and display wired together.
///
/// Every operation mutates the registry synchronously, then awaits the
/// recomputation, then refreshes the presenter exactly once. A rejected
/// operation touches neither the dataset nor the presenter.
pub struct FilterSession<D, P> {
    registry: FilterRegistry,
    worker: RecomputeWorker<D>,
    presenter: P,
    last_view: Option<FilteredView>,
}

impl<D, P> FilterSession<D, P>
where
    D: LogDataset + Send + 'static,
    P: Presenter,
{
    pub fn new(registry: FilterRegistry, dataset: D, presenter: P) -> Self {
        Self {
            registry,
            worker: RecomputeWorker::new(dataset),
            presenter,
            last_view: None,
        }
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn worker(&self) -> &RecomputeWorker<D> {
        &self.worker
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        self.registry.snapshot()
    }

    /// The view produced by the most recent recomputation
    pub fn last_view(&self) -> Option<&FilteredView> {
        self.last_view.as_ref()
    }

    pub async fn apply(&mut self, kind: FilterKind, input: FilterInput) -> Result<FilteredView> {
        let request = self.registry.apply(kind, input)?;
        self.finish(request).await
    }

    pub async fn activate(&mut self, kind: FilterKind, input: FilterInput) -> Result<FilteredView> {
        let request = self.registry.activate(kind, input)?;
        self.finish(request).await
    }

    pub async fn update(&mut self, kind: FilterKind, input: FilterInput) -> Result<FilteredView> {
        let request = self.registry.update(kind, input)?;
        self.finish(request).await
    }

    /// Remove a filter. Returns None without recomputing or refreshing when it was not active.
    pub async fn remove(&mut self, kind: FilterKind) -> Result<Option<FilteredView>> {
        match self.registry.remove(kind) {
            Some(request) => self.finish(request).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn remove_thread_id(&mut self, tid: u64) -> Result<FilteredView> {
        let request = self.registry.remove_thread_id(tid)?;
        self.finish(request).await
    }

    pub async fn clear_all(&mut self) -> Result<FilteredView> {
        let request = self.registry.clear_all();
        self.finish(request).await
    }

    async fn finish(&mut self, request: ChainRequest) -> Result<FilteredView> {
        let view = self.worker.run(request).await?;
        self.presenter.refresh_display(&self.registry.snapshot(), &view);
        self.last_view = Some(view.clone());
        Ok(view)
    }
}
