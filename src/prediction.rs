use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::{
    algorithm::Algorithm,
    api::{Backend, PredictRequest, PredictionResult},
    display::{DisplayState, Resolution},
    error::{ClientErr, Result},
    input::{self, PredictionInput, ValidatedInput},
};

/// Sends single-record predictions, one at a time.
pub struct PredictionClient<B: Backend> {
    backend: Arc<B>,
    state: DisplayState<PredictionResult>,
    pending: Option<oneshot::Receiver<Result<PredictionResult>>>,
    last_error: Option<String>,
}

impl<B: Backend> PredictionClient<B> {
    /// Creates a new idle `PredictionClient`.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: DisplayState::Idle,
            pending: None,
            last_error: None,
        }
    }

    /// Whether the submit trigger should be enabled for `input`.
    pub fn can_submit(&self, input: &PredictionInput) -> bool {
        !self.is_busy() && input::is_submittable(input)
    }

    /// Whether a prediction is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Sends `input` to be priced by `algorithm`.
    ///
    /// Any previous result is cleared at once, before the new request
    /// settles either way. Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns `ClientErr::Busy` without sending anything if a prediction is
    /// already in flight.
    pub fn submit(&mut self, algorithm: Algorithm, input: &ValidatedInput) -> Result<()> {
        if self.is_busy() {
            warn!("prediction already in flight, ignoring submit");
            return Err(ClientErr::Busy);
        }

        self.state.begin();
        self.last_error = None;

        let request = self.backend.predict(PredictRequest::new(algorithm, input));
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(request.await);
        });
        self.pending = Some(rx);

        info!("requesting {algorithm} prediction");
        Ok(())
    }

    /// Validates the form record and submits it.
    ///
    /// # Errors
    /// Returns `ClientErr::Validation` if a field is not a finite number, in
    /// which case no request is sent and the displayed result is untouched.
    pub fn submit_input(&mut self, algorithm: Algorithm, input: &PredictionInput) -> Result<()> {
        let input = input::validate(input)?;
        self.submit(algorithm, &input)
    }

    /// Applies the in-flight prediction if it has finished. Non-blocking.
    pub fn tick(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(ClientErr::Interrupted),
        };
        self.pending = None;
        let _ = self.apply(result);
    }

    /// Waits for the in-flight prediction and applies it.
    ///
    /// # Returns
    /// `None` if nothing was in flight, otherwise how the request ended.
    pub async fn wait(&mut self) -> Option<Result<PredictionResult>> {
        let rx = self.pending.take()?;
        let result = rx.await.unwrap_or(Err(ClientErr::Interrupted));
        Some(self.apply(result))
    }

    /// Validates, submits and waits for a single prediction.
    ///
    /// # Errors
    /// Returns the validation or request failure; a request failure also
    /// leaves the client in its `Error` state.
    pub async fn predict(
        &mut self,
        algorithm: Algorithm,
        input: &PredictionInput,
    ) -> Result<PredictionResult> {
        self.submit_input(algorithm, input)?;
        self.wait().await.unwrap_or(Err(ClientErr::Interrupted))
    }

    fn apply(&mut self, result: Result<PredictionResult>) -> Result<PredictionResult> {
        match result {
            Ok(prediction) => {
                self.state.resolve(Resolution::Data(prediction));
                info!("predicted price {:.2}", prediction.predicted_price);
                Ok(prediction)
            }
            Err(e) => {
                self.state.resolve(Resolution::Failed);
                error!("prediction failed: {e}");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Returns the latest prediction; absent while loading or after a failure.
    pub fn result(&self) -> Option<&PredictionResult> {
        self.state.data()
    }

    pub fn state(&self) -> &DisplayState<PredictionResult> {
        &self.state
    }

    /// Returns the message of the failure behind the current `Error` state.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
