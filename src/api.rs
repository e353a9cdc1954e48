use futures::future::{BoxFuture, FutureExt};
use log::debug;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    algorithm::Algorithm,
    config::DashboardConfig,
    error::{ClientErr, Result},
    input::ValidatedInput,
};

/// Evaluation metrics computed by the backend for one algorithm.
///
/// The backend reports `null` for a metric it has not recorded; the
/// response is still usable for its samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub r2_score: Option<f64>,
    pub mse: Option<f64>,
}

/// One `(index, actual, predicted)` triple of the comparison series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub index: i64,
    pub actual: f64,
    pub predicted: f64,
}

/// Body of a successful `GET /metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: Metrics,
    #[serde(default)]
    pub sample_predictions: Vec<SamplePoint>,
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictRequest {
    pub algorithm: Algorithm,
    pub area_sqft: f64,
    pub bedrooms: f64,
    pub stories: f64,
    pub year_built: f64,
}

impl PredictRequest {
    pub fn new(algorithm: Algorithm, input: &ValidatedInput) -> Self {
        Self {
            algorithm,
            area_sqft: input.area_sqft(),
            bedrooms: input.bedrooms(),
            stories: input.stories(),
            year_built: input.year_built(),
        }
    }
}

/// Body of a successful `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
}

impl PredictionResult {
    /// Formats the price the way the prediction panel shows it.
    pub fn display(&self) -> String {
        format!("Predicted Price: ${}", group_thousands(self.predicted_price))
    }
}

/// Body of a successful `POST /train`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainResponse {
    pub status: String,
    pub message: String,
    pub metrics: Metrics,
}

/// The backend operations the controllers depend on.
///
/// Each call returns an owned future that has already captured everything
/// it needs, so callers can move it onto a task right away.
pub trait Backend: Send + Sync + 'static {
    /// `GET /metrics?algorithm={algorithm}`.
    fn fetch_metrics(&self, algorithm: Algorithm) -> BoxFuture<'static, Result<MetricsResponse>>;

    /// `POST /predict`.
    fn predict(&self, request: PredictRequest) -> BoxFuture<'static, Result<PredictionResult>>;
}

/// [`Backend`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a new `HttpBackend`.
    ///
    /// # Args
    /// * `config` - Where the backend lives and how long to wait for it.
    ///
    /// # Errors
    /// Returns `ClientErr::Network` if the HTTP client cannot be built.
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        // The backend is addressed directly, never through a system proxy.
        let mut builder = Client::builder().no_proxy();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base url every endpoint is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Asks the backend to (re)train `algorithm` and returns its fresh metrics.
    pub async fn train(&self, algorithm: Algorithm) -> Result<TrainResponse> {
        let url = format!("{}/train", self.base_url);
        debug!("POST {url}?algorithm={algorithm}");

        let response = self
            .http
            .post(url)
            .query(&[("algorithm", algorithm.as_str())])
            .send()
            .await?;
        decode(response, "/train").await
    }
}

impl Backend for HttpBackend {
    fn fetch_metrics(&self, algorithm: Algorithm) -> BoxFuture<'static, Result<MetricsResponse>> {
        let http = self.http.clone();
        let url = format!("{}/metrics", self.base_url);

        async move {
            debug!("GET {url}?algorithm={algorithm}");
            let response = http
                .get(url)
                .query(&[("algorithm", algorithm.as_str())])
                .send()
                .await?;
            decode(response, "/metrics").await
        }
        .boxed()
    }

    fn predict(&self, request: PredictRequest) -> BoxFuture<'static, Result<PredictionResult>> {
        let http = self.http.clone();
        let url = format!("{}/predict", self.base_url);

        async move {
            debug!("POST {url} {request:?}");
            let response = http.post(url).json(&request).send().await?;
            decode(response, "/predict").await
        }
        .boxed()
    }
}

async fn decode<T: DeserializeOwned>(response: Response, endpoint: &'static str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientErr::Http {
            status: status.as_u16(),
            endpoint,
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientErr::Decode(format!("{endpoint}: {e}")))
}

/// Formats like a locale number: grouped thousands, at most three decimals,
/// trailing zeros dropped.
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac.trim_end_matches('0');

    let mut grouped = String::with_capacity(fixed.len() + whole.len() / 3 + 1);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac.is_empty() {
        grouped.push('.');
        grouped.push_str(frac);
    }

    if value < 0.0 && grouped.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        grouped.insert(0, '-');
    }
    grouped
}
