//! Keystroke-driven request coordination.
//!
//! A [`RequestCoordinator`] owns one search field of a lookup form. Form
//! changes are sent to a spawned task that debounces them, issues each settled
//! query under a strictly increasing [`QueryToken`], and delivers results only
//! when their token is still the latest issued one. Issuing a newer query
//! cancels the previous query's [`CancellationToken`], so superseded provider
//! calls stop early; the token comparison at completion stays authoritative
//! for work that ignores cancellation.
//!
//! ```text
//! Idle ──edit──▶ Debouncing ──quiet period──▶ Fetching(n) ──▶ Delivered(n)
//!                  ▲    │                          │
//!                  └edit┘                          └─ newer token issued ─▶ superseded
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let (coordinator, mut deliveries) =
//!     RequestCoordinator::spawn(engine, SearchField::Title, settings);
//! coordinator.update(FormInput::new(Category::Book, "dune", "herbert")).await?;
//! let delivery = deliveries.recv().await;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mediahint_common::{Category, ProviderQuery, QueryToken, SearchField, Suggestion};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{LookupConfig, LookupProfile};

use super::engine::Resolve;

/// Channel capacity for form updates and deliveries.
const CHANNEL_CAPACITY: usize = 32;

/// Current contents of the lookup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub category: Category,
    pub title: String,
    pub creator: String,
}

impl FormInput {
    pub fn new(category: Category, title: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            category,
            title: title.into(),
            creator: creator.into(),
        }
    }

    /// The value of `field` in this form.
    pub fn term(&self, field: SearchField) -> &str {
        match field {
            SearchField::Title => &self.title,
            SearchField::Creator => &self.creator,
        }
    }

    /// The query a coordinator for `field` issues for this form.
    pub fn query(&self, field: SearchField, token: QueryToken) -> ProviderQuery {
        ProviderQuery::new(
            self.category,
            field,
            self.term(field),
            self.term(field.other()),
            token,
        )
    }
}

/// Timing and size knobs for a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Quiet period after the last edit before a query is issued.
    pub debounce: Duration,
    /// Maximum suggestions per delivery.
    pub max_results: usize,
}

impl CoordinatorSettings {
    pub fn from_config(lookup: &LookupConfig, profile: &LookupProfile) -> Self {
        Self {
            debounce: Duration::from_millis(lookup.debounce_ms),
            max_results: profile.max_results,
        }
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            max_results: 5,
        }
    }
}

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Debouncing,
    Fetching(QueryToken),
    Delivered(QueryToken),
}

/// Running counters for one coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub issued: u64,
    pub delivered: u64,
    pub superseded: u64,
}

/// Results of one accepted query.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub token: QueryToken,
    pub query: ProviderQuery,
    pub suggestions: Vec<Suggestion>,
}

struct Shared {
    /// Raw value of the latest issued token; zero before the first query.
    latest: AtomicU64,
    status: Mutex<(CoordinatorState, CoordinatorStats)>,
}

impl Shared {
    fn set_state(&self, state: CoordinatorState) {
        self.status.lock().0 = state;
    }

    fn is_latest(&self, token: QueryToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.value()
    }
}

/// Handle to a spawned coordinator task for one search field.
///
/// The task runs until every handle is dropped and all in-flight work has
/// settled, after which the delivery channel closes.
#[derive(Clone)]
pub struct RequestCoordinator {
    field: SearchField,
    inputs: mpsc::Sender<FormInput>,
    shared: Arc<Shared>,
}

impl RequestCoordinator {
    /// Spawn a coordinator for `field` and return its handle together with
    /// the receiving end of its delivery channel.
    pub fn spawn(
        resolver: Arc<dyn Resolve>,
        field: SearchField,
        settings: CoordinatorSettings,
    ) -> (Self, mpsc::Receiver<Delivery>) {
        let (deliveries, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        (Self::spawn_into(resolver, field, settings, deliveries), receiver)
    }

    /// Spawn a coordinator that delivers into an existing channel.
    pub fn spawn_into(
        resolver: Arc<dyn Resolve>,
        field: SearchField,
        settings: CoordinatorSettings,
        deliveries: mpsc::Sender<Delivery>,
    ) -> Self {
        let (inputs, input_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            latest: AtomicU64::new(0),
            status: Mutex::new((CoordinatorState::Idle, CoordinatorStats::default())),
        });

        let runner = Runner {
            field,
            settings,
            resolver,
            inputs: input_rx,
            deliveries,
            shared: shared.clone(),
            in_flight: JoinSet::new(),
            cancel: None,
        };
        tokio::spawn(runner.run());

        Self {
            field,
            inputs,
            shared,
        }
    }

    pub fn field(&self) -> SearchField {
        self.field
    }

    /// Report a change to the form. Restarts the debounce period.
    pub async fn update(&self, input: FormInput) -> Result<()> {
        self.inputs
            .send(input)
            .await
            .map_err(|_| anyhow::anyhow!("Request coordinator for {} has stopped", self.field))
    }

    /// The latest issued token, if any query has been issued.
    pub fn latest_token(&self) -> Option<QueryToken> {
        match self.shared.latest.load(Ordering::Acquire) {
            0 => None,
            n => Some(QueryToken::new(n)),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.shared.status.lock().0
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.shared.status.lock().1
    }
}

type Completion = (ProviderQuery, Vec<Suggestion>);

struct Runner {
    field: SearchField,
    settings: CoordinatorSettings,
    resolver: Arc<dyn Resolve>,
    inputs: mpsc::Receiver<FormInput>,
    deliveries: mpsc::Sender<Delivery>,
    shared: Arc<Shared>,
    in_flight: JoinSet<Completion>,
    cancel: Option<CancellationToken>,
}

impl Runner {
    async fn run(mut self) {
        debug!(field = %self.field, "Request coordinator started");

        let mut pending: Option<FormInput> = None;
        let mut inputs_open = true;
        let deadline = sleep(self.settings.debounce);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                input = self.inputs.recv(), if inputs_open => match input {
                    Some(input) => {
                        pending = Some(input);
                        deadline.as_mut().reset(Instant::now() + self.settings.debounce);
                        self.shared.set_state(CoordinatorState::Debouncing);
                    }
                    None => inputs_open = false,
                },
                () = &mut deadline, if pending.is_some() => {
                    if let Some(input) = pending.take() {
                        self.issue(input).await;
                    }
                }
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    match joined {
                        Ok((query, suggestions)) => self.complete(query, suggestions).await,
                        Err(e) => warn!(field = %self.field, error = %e, "Lookup task failed"),
                    }
                }
                else => break,
            }
        }

        debug!(field = %self.field, "Request coordinator stopped");
    }

    async fn issue(&mut self, input: FormInput) {
        let token = QueryToken::new(self.shared.latest.fetch_add(1, Ordering::AcqRel) + 1);
        let query = input.query(self.field, token);

        let cancel = CancellationToken::new();
        if let Some(previous) = self.cancel.replace(cancel.clone()) {
            previous.cancel();
        }
        self.shared.status.lock().1.issued += 1;

        if query.is_empty() {
            debug!(field = %self.field, %token, "Empty primary term; delivering no suggestions");
            self.deliver(query, Vec::new()).await;
            return;
        }

        info!(
            field = %self.field,
            %token,
            category = %query.category(),
            term = query.primary_term(),
            "Issuing lookup"
        );
        self.shared.set_state(CoordinatorState::Fetching(token));

        let resolver = self.resolver.clone();
        let max_results = self.settings.max_results;
        self.in_flight.spawn(async move {
            let suggestions = resolver.resolve_query(&query, max_results, &cancel).await;
            (query, suggestions)
        });
    }

    async fn complete(&mut self, query: ProviderQuery, suggestions: Vec<Suggestion>) {
        if self.shared.is_latest(query.token()) {
            self.deliver(query, suggestions).await;
        } else {
            debug!(field = %self.field, token = %query.token(), "Discarding superseded results");
            self.shared.status.lock().1.superseded += 1;
        }
    }

    async fn deliver(&mut self, query: ProviderQuery, suggestions: Vec<Suggestion>) {
        let token = query.token();
        {
            let mut status = self.shared.status.lock();
            status.0 = CoordinatorState::Delivered(token);
            status.1.delivered += 1;
        }

        let delivery = Delivery {
            token,
            query,
            suggestions,
        };
        if self.deliveries.send(delivery).await.is_err() {
            debug!(field = %self.field, %token, "Delivery receiver dropped");
        }
    }
}

/// The pair of coordinators backing one lookup form: one per search field,
/// sharing a resolver and a delivery channel.
#[derive(Clone)]
pub struct LookupScreen {
    title: RequestCoordinator,
    creator: RequestCoordinator,
}

impl LookupScreen {
    pub fn spawn(
        resolver: Arc<dyn Resolve>,
        settings: CoordinatorSettings,
    ) -> (Self, mpsc::Receiver<Delivery>) {
        let (deliveries, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let title = RequestCoordinator::spawn_into(
            resolver.clone(),
            SearchField::Title,
            settings,
            deliveries.clone(),
        );
        let creator =
            RequestCoordinator::spawn_into(resolver, SearchField::Creator, settings, deliveries);
        (Self { title, creator }, receiver)
    }

    /// Forward a form change to both coordinators.
    pub async fn update(&self, input: FormInput) -> Result<()> {
        self.title.update(input.clone()).await?;
        self.creator.update(input).await
    }

    pub fn coordinator(&self, field: SearchField) -> &RequestCoordinator {
        match field {
            SearchField::Title => &self.title,
            SearchField::Creator => &self.creator,
        }
    }
}
