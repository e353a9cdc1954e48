use std::{fmt, sync::Arc};

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::{
    algorithm::Algorithm,
    api::{Backend, Metrics, MetricsResponse},
    chart::{self, ChartData},
    display::{DisplayState, Resolution},
    error::{ClientErr, Result},
};

static NO_DATA: ChartData = ChartData::NoData;

/// Tag of one metrics request. Strictly increasing, never reused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a spawned fetch reports back to its controller.
#[derive(Debug)]
struct FetchOutcome {
    generation: Generation,
    algorithm: Algorithm,
    result: Result<MetricsResponse>,
}

/// Owns the selected algorithm and everything the metrics and chart views
/// show for it.
///
/// Fetches run as background tasks and never touch this state themselves:
/// they send their outcome back, and only the controller applies it. An
/// outcome is applied only if no newer selection has happened since its
/// request was issued, so the views always reflect the latest selection no
/// matter which order responses arrive in.
pub struct MetricsController<B: Backend> {
    backend: Arc<B>,
    algorithm: Algorithm,
    generation: Generation,
    in_flight: usize,
    metrics: Option<Metrics>,
    state: DisplayState<ChartData>,
    last_error: Option<String>,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl<B: Backend> MetricsController<B> {
    /// Creates a new `MetricsController` with `Linear` selected and nothing
    /// fetched yet.
    ///
    /// # Args
    /// * `backend` - Where metrics are fetched from.
    pub fn new(backend: Arc<B>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            backend,
            algorithm: Algorithm::default(),
            generation: Generation::default(),
            in_flight: 0,
            metrics: None,
            state: DisplayState::Idle,
            last_error: None,
            tx,
            rx,
        }
    }

    /// Selects `algorithm` and starts fetching its metrics.
    ///
    /// Whatever was shown is cleared right away. Selecting the algorithm that
    /// is already selected issues a fresh request all the same.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    /// The generation tagging the new request.
    pub fn select_algorithm(&mut self, algorithm: Algorithm) -> Generation {
        self.algorithm = algorithm;
        self.generation = self.generation.next();
        self.metrics = None;
        self.last_error = None;
        self.state.begin();

        let generation = self.generation;
        let request = self.backend.fetch_metrics(algorithm);
        let tx = self.tx.clone();

        self.in_flight += 1;
        let fetch = tokio::spawn(request);
        tokio::spawn(async move {
            let result = fetch.await.unwrap_or_else(|e| {
                warn!("metrics fetch for {algorithm} ({generation}) did not finish: {e}");
                Err(ClientErr::Interrupted)
            });
            // The controller may be gone by now, nobody is left to care.
            let _ = tx.send(FetchOutcome {
                generation,
                algorithm,
                result,
            });
        });

        info!("fetching metrics for {algorithm} ({generation})");
        generation
    }

    /// Fetches the selected algorithm again.
    pub fn refresh(&mut self) -> Generation {
        self.select_algorithm(self.algorithm)
    }

    /// Applies every outcome that has already arrived. Non-blocking.
    ///
    /// Should be called once per UI frame tick.
    pub fn tick(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply(outcome);
        }
    }

    /// Waits for the next outcome to arrive and applies it.
    ///
    /// # Returns
    /// `None` if nothing is in flight, otherwise whether the outcome was
    /// applied (`false` means it was stale and dropped).
    pub async fn apply_next(&mut self) -> Option<bool> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.rx.recv().await?;
        Some(self.apply(outcome))
    }

    /// Waits until every request issued so far has finished.
    pub async fn settle(&mut self) {
        while self.apply_next().await.is_some() {}
    }

    fn apply(&mut self, outcome: FetchOutcome) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        let FetchOutcome {
            generation,
            algorithm,
            result,
        } = outcome;

        if generation != self.generation {
            debug!(
                "dropping stale metrics for {algorithm} ({generation}, current {})",
                self.generation
            );
            return false;
        }

        match result {
            Ok(response) => {
                let resolution = match chart::adapt(&response.sample_predictions) {
                    ChartData::NoData => Resolution::Empty,
                    series => Resolution::Data(series),
                };
                if !self.state.resolve(resolution) {
                    return false;
                }
                self.metrics = Some(response.metrics);
                self.last_error = None;
                info!(
                    "metrics for {algorithm} ready: r2={:?} mse={:?} samples={}",
                    response.metrics.r2_score,
                    response.metrics.mse,
                    response.sample_predictions.len()
                );
            }
            Err(e) => {
                if !self.state.resolve(Resolution::Failed) {
                    return false;
                }
                error!("failed to fetch metrics for {algorithm}: {e}");
                self.metrics = None;
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    /// Returns the selected algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the tag of the most recently issued request.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns how many issued requests have not reported back yet,
    /// superseded ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns the metrics of the selected algorithm, once loaded.
    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    /// Returns the chart series; `NoData` unless the state is `Ready`.
    pub fn chart(&self) -> &ChartData {
        self.state.data().unwrap_or(&NO_DATA)
    }

    pub fn state(&self) -> &DisplayState<ChartData> {
        &self.state
    }

    /// Returns the message of the failure behind the current `Error` state.
    ///
    /// Failures are only logged; this is here for front ends that want to
    /// show them anyway.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the metric cards to show, in display order.
    pub fn cards(&self) -> Vec<(&'static str, Option<f64>)> {
        match (&self.state, self.metrics) {
            (DisplayState::Loading, _) | (_, None) => Vec::new(),
            (_, Some(m)) => vec![("R² Score", m.r2_score), ("Mean Squared Error", m.mse)],
        }
    }
}
