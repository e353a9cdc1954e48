use log::warn;

/// What a view is currently showing.
///
/// There is no terminal state: every state can start a new load.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DisplayState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Empty,
    Error,
}

/// How a load finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Data(T),
    Empty,
    Failed,
}

impl<T> DisplayState<T> {
    /// Starts a new load, dropping whatever was shown.
    pub fn begin(&mut self) {
        *self = DisplayState::Loading;
    }

    /// Finishes the current load.
    ///
    /// # Returns
    /// `false` and leaves the state untouched if nothing was loading.
    pub fn resolve(&mut self, resolution: Resolution<T>) -> bool {
        if !self.is_loading() {
            warn!("resolution received while {}, ignoring", self.name());
            return false;
        }

        *self = match resolution {
            Resolution::Data(data) => DisplayState::Ready(data),
            Resolution::Empty => DisplayState::Empty,
            Resolution::Failed => DisplayState::Error,
        };
        true
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DisplayState::Loading)
    }

    /// Returns the loaded data, if the state is `Ready`.
    pub fn data(&self) -> Option<&T> {
        match self {
            DisplayState::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the state's name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            DisplayState::Idle => "idle",
            DisplayState::Loading => "loading",
            DisplayState::Ready(_) => "ready",
            DisplayState::Empty => "empty",
            DisplayState::Error => "error",
        }
    }
}
