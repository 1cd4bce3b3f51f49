//! Dashboard aggregation.
//!
//! A dashboard run issues four independent list queries (trending, popular
//! this season, upcoming next season, all-time popular), waits for all four
//! outcomes, and publishes them as one immutable [`DashboardState`].
//!
//! Only the most recently started run may publish. Starting a new run aborts
//! the previous one, and a result that still arrives for a superseded run is
//! discarded by the single-flight generation check.
//!
//! When any query fails the run still publishes a full snapshot: every list
//! is either `Loaded` or `Failed`, and the run status names the failed lists.
//! No field of an older snapshot survives into the new one.

use crate::api::{MediaListRequest, MediaPage};
use crate::error::{MediaError, NetworkError};
use crate::repository::MediaListRepository;
use crate::single_flight::{RunId, SingleFlight};
use chrono::{Local, NaiveDate};
use shared::{Config, MediaSort, MediaType, SeasonYear};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, warn};

/// Every dashboard list starts from the first page
pub const DASHBOARD_PAGE: u32 = 0;

/// Items per dashboard list
pub const DASHBOARD_PER_PAGE: u32 = 10;

/// Finished runs whose outcome [`Dashboard::wait`] can still report
const OUTCOMES_KEPT: usize = 32;

/// The four dashboard lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardList {
    Trending,
    PopularThisSeason,
    UpcomingNextSeason,
    AllTimePopular,
}

impl DashboardList {
    pub const ALL: [DashboardList; 4] = [
        DashboardList::Trending,
        DashboardList::PopularThisSeason,
        DashboardList::UpcomingNextSeason,
        DashboardList::AllTimePopular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardList::Trending => "trending",
            DashboardList::PopularThisSeason => "popular_this_season",
            DashboardList::UpcomingNextSeason => "upcoming_next_season",
            DashboardList::AllTimePopular => "all_time_popular",
        }
    }
}

impl std::fmt::Display for DashboardList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one list
#[derive(Debug, Clone, Default)]
pub enum ListState {
    /// Not fetched yet
    #[default]
    Pending,
    Loaded(MediaPage),
    Failed(Arc<MediaError>),
}

impl ListState {
    pub fn page(&self) -> Option<&MediaPage> {
        match self {
            ListState::Loaded(page) => Some(page),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&MediaError> {
        match self {
            ListState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ListState::Pending)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ListState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ListState::Failed(_))
    }
}

impl From<Result<MediaPage, MediaError>> for ListState {
    fn from(result: Result<MediaPage, MediaError>) -> Self {
        match result {
            Ok(page) => ListState::Loaded(page),
            Err(error) => ListState::Failed(Arc::new(error)),
        }
    }
}

/// Immutable dashboard snapshot
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Run that produced this snapshot
    pub run: Option<RunId>,
    pub media_type: Option<MediaType>,
    pub this_season: Option<SeasonYear>,
    pub next_season: Option<SeasonYear>,
    pub trending: ListState,
    pub popular: ListState,
    pub upcoming: ListState,
    pub all_time_popular: ListState,
}

impl DashboardState {
    pub fn list(&self, which: DashboardList) -> &ListState {
        match which {
            DashboardList::Trending => &self.trending,
            DashboardList::PopularThisSeason => &self.popular,
            DashboardList::UpcomingNextSeason => &self.upcoming,
            DashboardList::AllTimePopular => &self.all_time_popular,
        }
    }

    pub fn failed_lists(&self) -> Vec<DashboardList> {
        DashboardList::ALL
            .into_iter()
            .filter(|which| self.list(*which).is_failed())
            .collect()
    }
}

/// Lifecycle of the latest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunStatus {
    #[default]
    Idle,
    Running {
        run: RunId,
        media_type: MediaType,
    },
    Completed {
        run: RunId,
    },
    Cancelled {
        run: RunId,
    },
    Failed {
        run: RunId,
        failed: Vec<DashboardList>,
    },
}

impl RunStatus {
    pub fn run(&self) -> Option<RunId> {
        match self {
            RunStatus::Idle => None,
            RunStatus::Running { run, .. }
            | RunStatus::Completed { run }
            | RunStatus::Cancelled { run }
            | RunStatus::Failed { run, .. } => Some(*run),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed { .. } | RunStatus::Cancelled { .. } | RunStatus::Failed { .. }
        )
    }
}

/// Tunables for a dashboard
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Upper bound on each list query; `None` waits indefinitely
    pub query_timeout: Option<Duration>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            query_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl DashboardOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            query_timeout: Some(config.query_timeout()),
        }
    }
}

/// The four requests of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardPlan {
    pub media_type: MediaType,
    pub this_season: SeasonYear,
    pub next_season: SeasonYear,
}

impl DashboardPlan {
    pub fn new(media_type: MediaType, today: NaiveDate) -> Self {
        Self {
            media_type,
            this_season: SeasonYear::of_date(today),
            next_season: SeasonYear::following(today),
        }
    }

    pub fn request(&self, which: DashboardList) -> MediaListRequest {
        let sort = match which {
            DashboardList::Trending => MediaSort::TrendingDesc,
            _ => MediaSort::PopularityDesc,
        };
        let request = MediaListRequest::new(
            self.media_type,
            DASHBOARD_PAGE,
            DASHBOARD_PER_PAGE,
            vec![sort],
        );

        match which {
            DashboardList::PopularThisSeason => request.in_season(self.this_season),
            DashboardList::UpcomingNextSeason => request.in_season(self.next_season),
            DashboardList::Trending | DashboardList::AllTimePopular => request,
        }
    }
}

/// Terminal statuses of runs that published
#[derive(Debug, Default)]
struct Outcomes {
    finished: BTreeMap<RunId, RunStatus>,
    /// Newest run whose outcome was evicted
    forgotten_through: Option<RunId>,
}

impl Outcomes {
    fn record(&mut self, status: RunStatus) {
        if let Some(run) = status.run() {
            self.finished.insert(run, status);
        }
        while self.finished.len() > OUTCOMES_KEPT {
            let Some((run, _)) = self.finished.pop_first() else {
                break;
            };
            self.forgotten_through = Some(run);
        }
    }

    /// Outcome of a run that is no longer running
    fn of(&self, run: RunId) -> Result<RunStatus, MediaError> {
        if let Some(status) = self.finished.get(&run) {
            return Ok(status.clone());
        }
        match self.forgotten_through {
            Some(forgotten) if run <= forgotten => Err(MediaError::invalid(format!(
                "outcome of {} is no longer kept",
                run
            ))),
            // Never published: cancelled or superseded
            _ => Err(MediaError::Cancelled),
        }
    }
}

struct Shared {
    repository: MediaListRepository,
    options: DashboardOptions,
    flight: SingleFlight,
    snapshot_tx: watch::Sender<Arc<DashboardState>>,
    status_tx: watch::Sender<RunStatus>,
    outcomes: Mutex<Outcomes>,
}

impl Shared {
    fn outcomes(&self) -> MutexGuard<'_, Outcomes> {
        self.outcomes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn execute(self: Arc<Self>, run: RunId, plan: DashboardPlan) {
        info!(
            %run,
            media_type = %plan.media_type,
            this_season = %plan.this_season,
            next_season = %plan.next_season,
            "Dashboard run started"
        );

        let (trending, popular, upcoming, all_time_popular) = tokio::join!(
            self.fetch(run, &plan, DashboardList::Trending),
            self.fetch(run, &plan, DashboardList::PopularThisSeason),
            self.fetch(run, &plan, DashboardList::UpcomingNextSeason),
            self.fetch(run, &plan, DashboardList::AllTimePopular),
        );

        let state = DashboardState {
            run: Some(run),
            media_type: Some(plan.media_type),
            this_season: Some(plan.this_season),
            next_season: Some(plan.next_season),
            trending: trending.into(),
            popular: popular.into(),
            upcoming: upcoming.into(),
            all_time_popular: all_time_popular.into(),
        };

        let failed = state.failed_lists();
        let failed_count = failed.len();
        let status = if failed.is_empty() {
            RunStatus::Completed { run }
        } else {
            RunStatus::Failed { run, failed }
        };

        let published = self.flight.publish_if_current(run, || {
            self.outcomes().record(status.clone());
            self.snapshot_tx.send_replace(Arc::new(state));
            self.status_tx.send_replace(status);
        });

        if !published {
            info!(%run, "Dashboard run superseded, results discarded");
        } else if failed_count == 0 {
            info!(%run, "Dashboard run completed");
        } else {
            warn!(%run, failed = failed_count, "Dashboard run finished with failed lists");
        }
    }

    async fn fetch(
        &self,
        run: RunId,
        plan: &DashboardPlan,
        which: DashboardList,
    ) -> Result<MediaPage, MediaError> {
        let request = plan.request(which);
        let query = self.repository.fetch_media_list(&request);

        let result = match self.options.query_timeout {
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .unwrap_or_else(|_| Err(NetworkError::Timeout.into())),
            None => query.await,
        };

        if let Err(e) = &result {
            warn!(%run, list = %which, error = %e, "Dashboard list failed");
        }
        result
    }
}

/// Aggregates the four dashboard lists into one snapshot, single-flight
pub struct Dashboard {
    shared: Arc<Shared>,
}

impl Dashboard {
    /// Create a dashboard whose runs are spawned on `executor`
    pub fn new(
        repository: MediaListRepository,
        executor: Handle,
        options: DashboardOptions,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(DashboardState::default()));
        let (status_tx, _) = watch::channel(RunStatus::Idle);

        Self {
            shared: Arc::new(Shared {
                repository,
                options,
                flight: SingleFlight::new(executor),
                snapshot_tx,
                status_tx,
                outcomes: Mutex::new(Outcomes::default()),
            }),
        }
    }

    /// Start a run for today's date, superseding any run in flight
    pub fn refresh(&self, media_type: MediaType) -> RunId {
        self.refresh_on(media_type, Local::now().date_naive())
    }

    /// Start a run as if today were `today`
    pub fn refresh_on(&self, media_type: MediaType, today: NaiveDate) -> RunId {
        let plan = DashboardPlan::new(media_type, today);
        let shared = &self.shared;

        let (run, superseded) = shared.flight.launch(|run| {
            shared
                .status_tx
                .send_replace(RunStatus::Running { run, media_type });
            Arc::clone(shared).execute(run, plan)
        });

        if let Some(previous) = superseded {
            info!(%previous, %run, "Dashboard run superseded");
        }
        run
    }

    /// Cancel the run in flight; the current snapshot stays as it is
    pub fn cancel(&self) -> Option<RunId> {
        let status_tx = &self.shared.status_tx;
        let cancelled = self.shared.flight.cancel(|cancelled| {
            if let Some(run) = cancelled {
                status_tx.send_replace(RunStatus::Cancelled { run });
            }
        });
        if let Some(run) = cancelled {
            info!(%run, "Dashboard run cancelled");
        }
        cancelled
    }

    /// Wait until `run` is over and return its `Completed` or `Failed` status
    ///
    /// Works for runs that already finished, even after later refreshes.
    /// Fails with [`MediaError::Cancelled`] when the run was cancelled or
    /// superseded before it could publish.
    pub async fn wait(&self, run: RunId) -> Result<RunStatus, MediaError> {
        let mut status_rx = self.subscribe_status();
        status_rx
            .wait_for(|status| match status.run() {
                Some(current) => current > run || (current == run && status.is_terminal()),
                None => false,
            })
            .await
            .map_err(|_| MediaError::Cancelled)?;

        self.shared.outcomes().of(run)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<DashboardState> {
        self.shared.snapshot_tx.borrow().clone()
    }

    pub fn status(&self) -> RunStatus {
        self.shared.status_tx.borrow().clone()
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardState>> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RunStatus> {
        self.shared.status_tx.subscribe()
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.shared.flight.cancel(|_| {});
    }
}
