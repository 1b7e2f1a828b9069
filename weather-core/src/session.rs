//! Submission lifecycle: Idle → Loading → (Success | Error) → Idle.
//!
//! All display state lives in one [`UiState`] so impossible combinations
//! (loading while showing an error, say) cannot be represented. Every
//! submission takes a fresh [`RequestToken`]; a response carrying an older
//! token is dropped, so the last *submitted* query wins no matter in which
//! order responses settle. An error is cleared after [`ERROR_DISPLAY_DURATION`]
//! by a timer task which is aborted whenever the error is superseded.

use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

use crate::{
    FetchError, SubmitError,
    location::LocationState,
    model::{WeatherQuery, WeatherResult},
    provider::{ProviderOutcome, ProviderReply, WeatherFetcher},
};

pub const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(3);

/// Shown for transport and parse failures.
pub const TRANSPORT_ERROR_MESSAGE: &str = "unable to reach the weather service";

#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    Idle,
    Loading,
    Success(WeatherResult),
    Error(String),
}

/// An explicit submit action.
#[derive(Debug, Clone)]
pub enum Submission {
    Text(String),
    Location(LocationState),
}

impl Submission {
    pub fn into_query(self) -> Result<WeatherQuery, SubmitError> {
        match self {
            Submission::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Err(SubmitError::BlankInput)
                } else {
                    Ok(WeatherQuery::Place(trimmed.to_string()))
                }
            }
            Submission::Location(state) => state.coordinates().map(WeatherQuery::Coordinates),
        }
    }
}

/// Identifies one submission; only the newest token may update state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// What a front-end renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub state: UiState,
    pub last_result: Option<WeatherResult>,
}

impl SessionView {
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            UiState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, UiState::Loading)
    }
}

#[derive(Debug)]
struct Inner {
    state: UiState,
    last_result: Option<WeatherResult>,
    current_request: u64,
    /// Bumped each time an error is shown; a dismiss timer only clears its own error.
    error_epoch: u64,
    dismiss_timer: Option<JoinHandle<()>>,
}

impl Inner {
    fn cancel_dismiss_timer(&mut self) {
        if let Some(timer) = self.dismiss_timer.take() {
            timer.abort();
        }
    }
}

/// One user's lookup session. Cheap to clone; clones share state.
///
/// Methods that may show an error spawn the dismiss timer and must be called
/// from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct Session {
    fetcher: Arc<dyn WeatherFetcher>,
    inner: Arc<Mutex<Inner>>,
    error_ttl: Duration,
}

impl Session {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self {
            fetcher,
            inner: Arc::new(Mutex::new(Inner {
                state: UiState::Idle,
                last_result: None,
                current_request: 0,
                error_epoch: 0,
                dismiss_timer: None,
            })),
            error_ttl: ERROR_DISPLAY_DURATION,
        }
    }

    pub fn with_error_ttl(mut self, ttl: Duration) -> Self {
        self.error_ttl = ttl;
        self
    }

    pub fn snapshot(&self) -> SessionView {
        let inner = self.inner.lock();
        SessionView {
            state: inner.state.clone(),
            last_result: inner.last_result.clone(),
        }
    }

    /// Validate and submit, wait for the reply, and return the resulting view.
    pub async fn submit(&self, submission: Submission) -> SessionView {
        match self.begin(submission) {
            Ok((token, query)) => self.resolve(token, &query).await,
            Err(_) => self.snapshot(),
        }
    }

    /// First half of a submission: invalidate whatever is displayed, then either
    /// show a validation error or enter `Loading` and hand out the request token.
    pub fn begin(&self, submission: Submission) -> Result<(RequestToken, WeatherQuery), SubmitError> {
        let mut inner = self.inner.lock();
        inner.current_request += 1;
        inner.cancel_dismiss_timer();
        let token = RequestToken(inner.current_request);

        match submission.into_query() {
            Ok(query) => {
                tracing::info!(%query, "submitting weather lookup");
                inner.state = UiState::Loading;
                Ok((token, query))
            }
            Err(err) => {
                tracing::debug!(error = %err, "submission rejected locally");
                self.show_error(&mut inner, err.to_string());
                Err(err)
            }
        }
    }

    /// Second half of a submission: perform the network call and apply the reply.
    pub async fn resolve(&self, token: RequestToken, query: &WeatherQuery) -> SessionView {
        let reply = self.fetcher.fetch(query).await;
        self.complete(token, reply);
        self.snapshot()
    }

    /// Apply a settled request. Returns `false` if the token is stale and the
    /// reply was discarded.
    pub fn complete(&self, token: RequestToken, reply: Result<ProviderReply, FetchError>) -> bool {
        let mut inner = self.inner.lock();
        if token.0 != inner.current_request {
            tracing::debug!(
                stale = token.0,
                current = inner.current_request,
                "discarding stale weather response"
            );
            return false;
        }

        match reply.and_then(|r| r.outcome()) {
            Ok(ProviderOutcome::Weather(result)) => {
                inner.cancel_dismiss_timer();
                inner.last_result = Some(result.clone());
                inner.state = UiState::Success(result);
            }
            Ok(ProviderOutcome::Failure { code, message }) => {
                tracing::warn!(%code, %message, "weather provider reported an error");
                self.show_error(&mut inner, message.to_lowercase());
            }
            Err(err) => {
                tracing::warn!(error = %err, "weather request failed");
                self.show_error(&mut inner, TRANSPORT_ERROR_MESSAGE.to_string());
            }
        }

        true
    }

    /// Explicit user dismissal of the error display.
    pub fn dismiss_error(&self) {
        let mut inner = self.inner.lock();
        if matches!(inner.state, UiState::Error(_)) {
            inner.cancel_dismiss_timer();
            inner.state = UiState::Idle;
        }
    }

    fn show_error(&self, inner: &mut Inner, message: String) {
        inner.cancel_dismiss_timer();
        inner.error_epoch += 1;
        inner.state = UiState::Error(message);

        let epoch = inner.error_epoch;
        let shared = Arc::clone(&self.inner);
        let ttl = self.error_ttl;

        inner.dismiss_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;

            let mut inner = shared.lock();
            if inner.error_epoch == epoch && matches!(inner.state, UiState::Error(_)) {
                tracing::debug!("error display expired");
                inner.state = UiState::Idle;
                inner.dismiss_timer = None;
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays canned replies in order and counts calls.
    #[derive(Debug, Default)]
    struct ScriptedFetcher {
        replies: Mutex<VecDeque<Result<ProviderReply, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn with(replies: Vec<Result<ProviderReply, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherFetcher for ScriptedFetcher {
        async fn fetch(&self, _query: &WeatherQuery) -> Result<ProviderReply, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(ProviderReply { status: 500, body: "{}".into() }))
        }
    }

    fn weather_reply(name: &str) -> Result<ProviderReply, FetchError> {
        Ok(ProviderReply {
            status: 200,
            body: serde_json::json!({
                "cod": 200,
                "name": name,
                "sys": { "country": "FR" },
                "main": { "temp": 15.4, "feels_like": 14.1, "humidity": 60 },
                "wind": { "speed": 3.2 },
                "weather": [{ "id": 800, "description": "clear sky", "icon": "01d" }]
            })
            .to_string(),
        })
    }

    fn not_found_reply() -> Result<ProviderReply, FetchError> {
        Ok(ProviderReply {
            status: 404,
            body: r#"{"cod":"404","message":"City not found"}"#.into(),
        })
    }

    fn parse_failure() -> Result<ProviderReply, FetchError> {
        Err(serde_json::from_str::<serde_json::Value>("not json").unwrap_err().into())
    }

    #[tokio::test]
    async fn blank_text_is_rejected_without_network_call() {
        let fetcher = ScriptedFetcher::with(vec![]);
        let session = Session::new(fetcher.clone());

        let view = session.submit(Submission::Text("   ".into())).await;

        assert_eq!(view.error(), Some("please enter a city name"));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn missing_location_is_rejected_without_network_call() {
        let fetcher = ScriptedFetcher::with(vec![]);
        let session = Session::new(fetcher.clone());

        let view = session.submit(Submission::Location(LocationState::default())).await;

        assert_eq!(view.error(), Some("location unavailable: no position yet"));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn success_sets_result_and_clears_error() {
        let fetcher = ScriptedFetcher::with(vec![weather_reply("Paris")]);
        let session = Session::new(fetcher.clone());

        session.submit(Submission::Text(String::new())).await;
        let view = session.submit(Submission::Text(" Paris ".into())).await;

        let UiState::Success(result) = &view.state else {
            panic!("expected success, got {:?}", view.state);
        };
        assert_eq!(result.name, "Paris");
        assert_eq!(view.last_result.as_ref(), Some(result));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn location_submission_queries_coordinates() {
        let fetcher = ScriptedFetcher::with(vec![weather_reply("Paris")]);
        let session = Session::new(fetcher.clone());
        let here = LocationState::located(Coordinates::new(48.85, 2.35).unwrap());

        let view = session.submit(Submission::Location(here)).await;

        assert!(matches!(view.state, UiState::Success(_)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn provider_error_keeps_last_result() {
        let fetcher = ScriptedFetcher::with(vec![weather_reply("Paris"), not_found_reply()]);
        let session = Session::new(fetcher);

        session.submit(Submission::Text("Paris".into())).await;
        let view = session.submit(Submission::Text("Atlantis".into())).await;

        assert_eq!(view.error(), Some("city not found"));
        assert_eq!(view.last_result.map(|r| r.name), Some("Paris".to_string()));
    }

    #[tokio::test]
    async fn transport_failure_shows_generic_message() {
        let fetcher = ScriptedFetcher::with(vec![parse_failure()]);
        let session = Session::new(fetcher);

        let view = session.submit(Submission::Text("Paris".into())).await;

        assert_eq!(view.error(), Some(TRANSPORT_ERROR_MESSAGE));
        assert!(view.last_result.is_none());
    }

    #[tokio::test]
    async fn begin_enters_loading() {
        let session = Session::new(ScriptedFetcher::with(vec![]));
        let (_, query) = session.begin(Submission::Text("Paris".into())).unwrap();

        assert_eq!(query, WeatherQuery::Place("Paris".into()));
        assert!(session.snapshot().is_loading());
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let session = Session::new(ScriptedFetcher::with(vec![]));

        let (first, _) = session.begin(Submission::Text("Paris".into())).unwrap();
        let (second, _) = session.begin(Submission::Text("Berlin".into())).unwrap();

        assert!(session.complete(second, weather_reply("Berlin")));
        assert!(!session.complete(first, weather_reply("Paris")));

        let view = session.snapshot();
        assert_eq!(view.last_result.map(|r| r.name), Some("Berlin".to_string()));
    }

    #[tokio::test]
    async fn stale_response_cannot_overwrite_validation_error() {
        let session = Session::new(ScriptedFetcher::with(vec![]));

        let (token, _) = session.begin(Submission::Text("Paris".into())).unwrap();
        assert!(session.begin(Submission::Text(String::new())).is_err());

        assert!(!session.complete(token, weather_reply("Paris")));
        assert_eq!(session.snapshot().error(), Some("please enter a city name"));
    }

    #[tokio::test(start_paused = true)]
    async fn error_expires_after_fixed_delay() {
        let session = Session::new(ScriptedFetcher::with(vec![]));
        session.submit(Submission::Text(String::new())).await;

        tokio::time::sleep(ERROR_DISPLAY_DURATION - Duration::from_millis(100)).await;
        assert!(session.snapshot().error().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.snapshot().state, UiState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_error_cancels_older_timer() {
        let fetcher = ScriptedFetcher::with(vec![not_found_reply()]);
        let session = Session::new(fetcher);

        session.submit(Submission::Text(String::new())).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        session.submit(Submission::Text("Atlantis".into())).await;

        // Past the first error's deadline: the newer error must still be shown.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(session.snapshot().error(), Some("city not found"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(session.snapshot().state, UiState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_clears_error_immediately() {
        let session = Session::new(ScriptedFetcher::with(vec![]));
        session.submit(Submission::Text(String::new())).await;

        session.dismiss_error();
        assert_eq!(session.snapshot().state, UiState::Idle);

        tokio::time::sleep(ERROR_DISPLAY_DURATION * 2).await;
        assert_eq!(session.snapshot().state, UiState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_error_ttl() {
        let session =
            Session::new(ScriptedFetcher::with(vec![])).with_error_ttl(Duration::from_millis(500));
        session.submit(Submission::Text(String::new())).await;

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(session.snapshot().state, UiState::Idle);
    }
}
