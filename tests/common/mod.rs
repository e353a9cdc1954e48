#![allow(dead_code)]

use std::{collections::VecDeque, sync::Mutex};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;

use regression_dashboard::{
    api::{Backend, Metrics, MetricsResponse, PredictRequest, PredictionResult, SamplePoint},
    error::Result,
    Algorithm, ClientErr,
};

pub type Gate<T> = oneshot::Sender<Result<T>>;

/// In-memory backend whose requests only finish when the test opens the
/// matching gate. Gates are handed to requests in the order they are issued.
#[derive(Default)]
pub struct GatedBackend {
    metrics_gates: Mutex<VecDeque<oneshot::Receiver<Result<MetricsResponse>>>>,
    predict_gates: Mutex<VecDeque<oneshot::Receiver<Result<PredictionResult>>>>,
    metrics_calls: Mutex<Vec<Algorithm>>,
    predict_calls: Mutex<Vec<PredictRequest>>,
}

impl GatedBackend {
    /// Queues a gate for the next metrics request.
    pub fn metrics_gate(&self) -> Gate<MetricsResponse> {
        let (tx, rx) = oneshot::channel();
        self.metrics_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Queues a gate for the next prediction request.
    pub fn predict_gate(&self) -> Gate<PredictionResult> {
        let (tx, rx) = oneshot::channel();
        self.predict_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn metrics_calls(&self) -> Vec<Algorithm> {
        self.metrics_calls.lock().unwrap().clone()
    }

    pub fn predict_calls(&self) -> Vec<PredictRequest> {
        self.predict_calls.lock().unwrap().clone()
    }
}

impl Backend for GatedBackend {
    fn fetch_metrics(&self, algorithm: Algorithm) -> BoxFuture<'static, Result<MetricsResponse>> {
        self.metrics_calls.lock().unwrap().push(algorithm);
        let gate = self.metrics_gates.lock().unwrap().pop_front();
        open_when_released(gate, "/metrics").boxed()
    }

    fn predict(&self, request: PredictRequest) -> BoxFuture<'static, Result<PredictionResult>> {
        self.predict_calls.lock().unwrap().push(request);
        let gate = self.predict_gates.lock().unwrap().pop_front();
        open_when_released(gate, "/predict").boxed()
    }
}

/// Backend whose requests panic instead of answering.
pub struct PanickingBackend;

impl Backend for PanickingBackend {
    fn fetch_metrics(&self, algorithm: Algorithm) -> BoxFuture<'static, Result<MetricsResponse>> {
        async move { panic!("metrics handler for {algorithm} blew up") }.boxed()
    }

    fn predict(&self, _request: PredictRequest) -> BoxFuture<'static, Result<PredictionResult>> {
        async { panic!("predict handler blew up") }.boxed()
    }
}

async fn open_when_released<T>(
    gate: Option<oneshot::Receiver<Result<T>>>,
    endpoint: &'static str,
) -> Result<T> {
    match gate {
        Some(rx) => rx.await.unwrap_or(Err(ClientErr::Interrupted)),
        None => Err(ClientErr::Http {
            status: 404,
            endpoint,
        }),
    }
}

pub fn metrics_response(r2_score: f64, mse: f64, samples: &[(i64, f64, f64)]) -> MetricsResponse {
    MetricsResponse {
        metrics: Metrics {
            r2_score: Some(r2_score),
            mse: Some(mse),
        },
        sample_predictions: samples
            .iter()
            .map(|&(index, actual, predicted)| SamplePoint {
                index,
                actual,
                predicted,
            })
            .collect(),
    }
}

pub fn server_error(endpoint: &'static str) -> ClientErr {
    ClientErr::Http {
        status: 500,
        endpoint,
    }
}
