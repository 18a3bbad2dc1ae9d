//! Orchestrates location, resolution, weather and persistence into one
//! published [`AppState`].
//!
//! Every call to [`WeatherCoordinator::resolve_and_fetch`] takes a new
//! generation. Results are applied by a single `commit` step that runs under
//! the state channel's write lock, so completions never interleave. A commit
//! is applied only when its generation is newer than the last applied one;
//! anything older is dropped. Network calls are never cancelled, stale
//! results are simply discarded when they arrive.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};

use crate::{
    Coordinate, FALLBACK_COORDINATE, LastPlaceStore, LocationNotice, LocationProvider,
    PlaceQuery, PlaceResolver, ResolvedPlace, WeatherError, WeatherProvider, WeatherSnapshot,
};

/// Snapshot published to observers.
///
/// `weather`, `place_name` and `coordinate` are always replaced together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub weather: Option<WeatherSnapshot>,
    pub place_name: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub last_error: Option<WeatherError>,
}

/// What happened to one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// New weather and place name were published.
    Committed,
    /// The failure was recorded in `last_error`; prior weather was kept.
    Failed(WeatherError),
    /// A newer run had already committed; this result was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct WeatherCoordinator {
    provider: Arc<dyn WeatherProvider>,
    resolver: PlaceResolver,
    location: LocationProvider,
    store: Arc<dyn LastPlaceStore>,
    state: watch::Sender<AppState>,
    issued: AtomicU64,
    committed: AtomicU64,
    saved: Mutex<u64>,
}

impl WeatherCoordinator {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        location: LocationProvider,
        store: Arc<dyn LastPlaceStore>,
    ) -> Self {
        let (state, _) = watch::channel(AppState::default());

        Self {
            resolver: PlaceResolver::new(provider.clone()),
            provider,
            location,
            store,
            state,
            issued: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            saved: Mutex::new(0),
        }
    }

    /// Current state. Subscribers always see the latest value first.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn permission_notices(&self) -> broadcast::Receiver<LocationNotice> {
        self.location.notices()
    }

    /// Startup: weather for the last saved place, else for the device location.
    pub async fn start(&self) -> Outcome {
        self.resolve_and_fetch(self.startup_query()).await
    }

    pub async fn resolve_and_fetch(&self, query: PlaceQuery) -> Outcome {
        let generation = self.next_generation();
        self.run(generation, query).await
    }

    /// Run the pipeline on the runtime. The generation is taken now, so
    /// invocation order decides precedence even if tasks start out of order.
    pub fn spawn_resolve(self: &Arc<Self>, query: PlaceQuery) -> JoinHandle<Outcome> {
        let generation = self.next_generation();
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(generation, query).await })
    }

    pub fn spawn_start(self: &Arc<Self>) -> JoinHandle<Outcome> {
        let query = self.startup_query();
        self.spawn_resolve(query)
    }

    fn startup_query(&self) -> PlaceQuery {
        match self.store.load() {
            Some(name) => {
                tracing::info!(%name, "starting with last searched place");
                PlaceQuery::ByText(name)
            }
            None => {
                tracing::info!("no saved place, starting with device location");
                PlaceQuery::DeviceLocation
            }
        }
    }

    fn next_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn run(&self, generation: u64, query: PlaceQuery) -> Outcome {
        tracing::debug!(generation, ?query, "pipeline started");
        let result = self.fetch(query).await;
        self.commit(generation, result)
    }

    async fn fetch(
        &self,
        query: PlaceQuery,
    ) -> Result<(ResolvedPlace, WeatherSnapshot), WeatherError> {
        let query = match query {
            PlaceQuery::DeviceLocation => PlaceQuery::ByCoordinate(self.device_coordinate().await),
            other => other,
        };

        let place = self.resolver.resolve(&query).await?;
        let weather = self.provider.fetch_weather(place.coordinate()).await?;
        Ok((place, weather))
    }

    async fn device_coordinate(&self) -> Coordinate {
        match self.location.request_one_shot_location().await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                tracing::warn!("device location failed ({e}), using fallback coordinate");
                FALLBACK_COORDINATE
            }
        }
    }

    /// The only writer of `AppState`.
    ///
    /// The state update runs under the watch lock. Persisting the name happens
    /// after it is released, under `saved`, so readers never wait on disk and
    /// an older generation cannot overwrite a newer saved name.
    fn commit(
        &self,
        generation: u64,
        result: Result<(ResolvedPlace, WeatherSnapshot), WeatherError>,
    ) -> Outcome {
        let mut outcome = Outcome::Superseded;
        let mut committed_name = None;

        self.state.send_if_modified(|state| {
            if generation <= self.committed.load(Ordering::Acquire) {
                return false;
            }
            self.committed.store(generation, Ordering::Release);

            match result {
                Ok((place, weather)) => {
                    tracing::info!(generation, place = place.display_name(), "weather updated");
                    committed_name = Some(place.display_name().to_string());
                    state.weather = Some(weather);
                    state.coordinate = Some(place.coordinate());
                    state.place_name = Some(place.display_name().to_string());
                    state.last_error = None;
                    outcome = Outcome::Committed;
                }
                Err(e) => {
                    tracing::warn!(generation, "weather refresh failed: {e}");
                    state.last_error = Some(e.clone());
                    outcome = Outcome::Failed(e);
                }
            }
            true
        });

        if let Some(name) = committed_name {
            self.persist(generation, &name);
        }
        if outcome == Outcome::Superseded {
            tracing::warn!(generation, "dropping result from superseded request");
        }
        outcome
    }

    fn persist(&self, generation: u64, name: &str) {
        let mut saved = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if generation > *saved {
            self.store.save(name);
            *saved = generation;
        }
    }
}
