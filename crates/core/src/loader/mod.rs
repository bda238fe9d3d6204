//! Fetch-and-derive pipeline behind a submission page.
//!
//! A [`SubmissionSession`] lives as long as the page. Every `load` supersedes
//! the previous one: its cancellation token fires, its lookups stop, and its
//! result is dropped instead of being published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::authz::{AuthorizationEngine, AuthorizationInput, AuthorizationStatus, LookupCache};
use crate::domain::kpi::SubmissionEntry;
use crate::domain::organization::CurrentUser;
use crate::domain::submission::{SubmissionId, SubmissionKind};
use crate::gateway::{GatewayError, SubmissionGateway};

pub mod view;

pub use view::{EntryRow, LoadState, SubmissionView};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub submission_id: SubmissionId,
    /// Reporting month for actuals; falls back to the submission's own month.
    pub month: Option<u8>,
}

impl LoadRequest {
    pub fn new(submission_id: SubmissionId) -> Self {
        Self { submission_id, month: None }
    }

    pub fn for_month(submission_id: SubmissionId, month: u8) -> Self {
        Self { submission_id, month: Some(month) }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to load submission: {0}")]
    Submission(#[source] GatewayError),
    #[error("failed to load submission entries: {0}")]
    Entries(#[source] GatewayError),
    #[error("failed to load evidence: {0}")]
    Evidence(#[source] GatewayError),
    #[error("invalid load request: {0}")]
    InvalidRequest(String),
    #[error("load superseded by a newer request")]
    Superseded,
}

struct Inflight {
    generation: u64,
    token: CancellationToken,
}

pub struct SubmissionSession<G> {
    gateway: Arc<G>,
    user: CurrentUser,
    engine: AuthorizationEngine,
    cache: LookupCache,
    generation: AtomicU64,
    inflight: Mutex<Option<Inflight>>,
    last_request: Mutex<Option<LoadRequest>>,
    state: Mutex<LoadState>,
}

impl<G> SubmissionSession<G>
where
    G: SubmissionGateway,
{
    pub fn new(gateway: Arc<G>, user: CurrentUser) -> Self {
        Self {
            gateway,
            user,
            engine: AuthorizationEngine::new(),
            cache: LookupCache::new(),
            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
            last_request: Mutex::new(None),
            state: Mutex::new(LoadState::default()),
        }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    pub fn state(&self) -> LoadState {
        lock(&self.state).clone()
    }

    pub fn auth_status(&self) -> AuthorizationStatus {
        lock(&self.state).auth_status
    }

    pub async fn load(&self, request: LoadRequest) -> Result<SubmissionView, LoadError> {
        let (generation, token) = self.begin(request);
        self.cache.scope_to(request.submission_id).await;

        let correlation_id = Uuid::new_v4().to_string();
        info!(
            event_name = "loader.load.start",
            correlation_id = %correlation_id,
            submission_id = request.submission_id.0,
            month = ?request.month,
            generation,
            "loading submission"
        );

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(LoadError::Superseded),
            result = self.fetch(request, &token, &correlation_id) => result,
        };

        self.finish(generation, &token, &correlation_id, outcome)
    }

    /// Drops cached lookups and re-runs the last request.
    pub async fn refresh(&self) -> Result<SubmissionView, LoadError> {
        let Some(request) = *lock(&self.last_request) else {
            return Err(LoadError::InvalidRequest("nothing has been loaded yet".to_string()));
        };
        self.cache.clear().await;
        self.load(request).await
    }

    fn begin(&self, request: LoadRequest) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        let previous =
            lock(&self.inflight).replace(Inflight { generation, token: token.clone() });
        if let Some(previous) = previous {
            previous.token.cancel();
        }

        *lock(&self.last_request) = Some(request);
        let mut state = lock(&self.state);
        state.loading = true;
        state.error = None;

        (generation, token)
    }

    fn finish(
        &self,
        generation: u64,
        token: &CancellationToken,
        correlation_id: &str,
        outcome: Result<SubmissionView, LoadError>,
    ) -> Result<SubmissionView, LoadError> {
        let mut inflight = lock(&self.inflight);
        let current = inflight.as_ref().is_some_and(|slot| slot.generation == generation);
        if !current || token.is_cancelled() {
            info!(
                event_name = "loader.load.superseded",
                correlation_id = %correlation_id,
                generation,
                "discarding result of superseded load"
            );
            return Err(LoadError::Superseded);
        }
        *inflight = None;

        let mut state = lock(&self.state);
        state.loading = false;
        state.correlation_id = Some(correlation_id.to_string());
        match outcome {
            Ok(view) => {
                info!(
                    event_name = "loader.load.completed",
                    correlation_id = %correlation_id,
                    submission_id = view.submission.id.0,
                    rows = view.rows.len(),
                    can_view = view.auth.can_view,
                    "submission loaded"
                );
                state.error = None;
                state.auth_status = view.auth;
                state.data = Some(view.clone());
                Ok(view)
            }
            Err(error) => {
                warn!(
                    event_name = "loader.load.failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "submission load failed"
                );
                state.error = Some(error.to_string());
                state.data = None;
                state.auth_status = AuthorizationStatus::default();
                Err(error)
            }
        }
    }

    async fn fetch(
        &self,
        request: LoadRequest,
        token: &CancellationToken,
        correlation_id: &str,
    ) -> Result<SubmissionView, LoadError> {
        let gateway = self.gateway.as_ref();
        let submission =
            gateway.submission(request.submission_id).await.map_err(LoadError::Submission)?;

        let month = request.month.or(submission.month);
        if let Some(month) = month {
            if !(1..=12).contains(&month) {
                return Err(LoadError::InvalidRequest(format!("month {month} is outside 1..=12")));
            }
        }
        if submission.kind == SubmissionKind::Actual && month.is_none() {
            return Err(LoadError::InvalidRequest(format!(
                "actuals submission {} needs a reporting month",
                submission.id
            )));
        }

        let (entries, evidence) =
            tokio::join!(gateway.entries(submission.id), gateway.evidence(submission.id));
        let entries = entries.map_err(LoadError::Entries)?;
        let evidence = evidence.map_err(LoadError::Evidence)?;

        let actuals_month = match submission.kind {
            SubmissionKind::Actual => month,
            SubmissionKind::Target => None,
        };
        let rows = join_all(
            entries.iter().map(|entry| self.build_row(entry, submission.id, actuals_month)),
        )
        .await;

        let auth = self
            .engine
            .derive_until_cancelled(
                AuthorizationInput {
                    submission: &submission,
                    user: &self.user,
                    evidence_count: evidence.len(),
                },
                gateway,
                &self.cache,
                token,
            )
            .await
            .map_err(|_| LoadError::Superseded)?;

        Ok(SubmissionView {
            submission,
            rows,
            evidence,
            auth,
            correlation_id: correlation_id.to_string(),
        })
    }

    async fn build_row(
        &self,
        entry: &SubmissionEntry,
        submission_id: SubmissionId,
        month: Option<u8>,
    ) -> EntryRow {
        let gateway = self.gateway.as_ref();

        let actuals_fetch = async {
            match month {
                Some(month) => Some(gateway.kpi_actuals(entry.kpi_id, month).await),
                None => None,
            }
        };
        let (definition, targets, actuals) = tokio::join!(
            gateway.kpi_definition(entry.kpi_id),
            gateway.kpi_targets(entry.entry_id, submission_id),
            actuals_fetch,
        );

        let definition = match definition {
            Ok(definition) => definition,
            Err(error) => {
                warn!(
                    event_name = "loader.entry.definition_failed",
                    entry_id = entry.entry_id.0,
                    kpi_id = entry.kpi_id.0,
                    error = %error,
                    "kpi definition unavailable; using defaults"
                );
                None
            }
        };

        let targets = match targets {
            Ok(targets) => targets,
            Err(error) => {
                warn!(
                    event_name = "loader.entry.targets_failed",
                    entry_id = entry.entry_id.0,
                    error = %error,
                    "kpi targets unavailable; using zeros"
                );
                Vec::new()
            }
        };

        let actuals = match actuals {
            Some(Ok(actuals)) => actuals,
            Some(Err(error)) => {
                warn!(
                    event_name = "loader.entry.actuals_failed",
                    entry_id = entry.entry_id.0,
                    kpi_id = entry.kpi_id.0,
                    month = ?month,
                    error = %error,
                    "kpi actuals unavailable; using zeros"
                );
                Vec::new()
            }
            None => Vec::new(),
        };

        EntryRow::assemble(
            entry,
            definition,
            &targets,
            view::select_actual(&actuals, submission_id),
            month,
        )
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
