//! Provider rate cache.
//!
//! One slot per base currency. A slot moves through
//! `Empty -> Populating -> Fresh -> Stale -> Populating -> Fresh ...`.
//!
//! Population is at-most-one-in-flight per base: the first caller spawns the
//! fetch and every later caller subscribes to the same `watch` channel. The
//! fetch runs in its own task, so a caller that gives up (deadline, dropped
//! request) never aborts it for the others.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::Instant;

use fx_types::{
    CacheEntryStatus, CacheError, CacheState, CurrencyCode, FetchError, ProviderRateTable,
    RateProvider,
};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// What a lookup does when the table for its base has outlived the TTL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Wait for the renewal and use the new table.
    #[default]
    Block,
    /// Serve the stale table and renew in the background.
    Revalidate,
}

impl FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "revalidate" | "stale-while-revalidate" => Ok(Self::Revalidate),
            other => Err(format!("unknown stale policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// How long an installed table counts as fresh.
    pub ttl: Duration,
    /// Upper bound on a single provider fetch.
    pub fetch_timeout: Duration,
    pub stale_policy: StalePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            fetch_timeout: Duration::from_secs(5),
            stale_policy: StalePolicy::Block,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Slots
// ─────────────────────────────────────────────────────────────────────────────

/// `None` until the in-flight fetch finishes.
type FetchOutcome = Option<Result<Arc<ProviderRateTable>, FetchError>>;

#[derive(Default)]
struct SlotState {
    table: Option<Arc<ProviderRateTable>>,
    installed_at: Option<Instant>,
    inflight: Option<watch::Receiver<FetchOutcome>>,
}

impl SlotState {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.installed_at
            .is_some_and(|at| Instant::now().duration_since(at) < ttl)
    }

    /// The receiver of a fetch that is still running, if any.
    ///
    /// A fetch task that panicked drops its sender without clearing the
    /// slot; such a receiver is closed and is treated as absent.
    fn live_inflight(&self) -> Option<&watch::Receiver<FetchOutcome>> {
        self.inflight.as_ref().filter(|rx| rx.has_changed().is_ok())
    }

    fn state(&self, ttl: Duration) -> CacheState {
        if self.live_inflight().is_some() {
            CacheState::Populating
        } else if self.table.is_none() {
            CacheState::Empty
        } else if self.is_fresh(ttl) {
            CacheState::Fresh
        } else {
            CacheState::Stale
        }
    }
}

#[derive(Default)]
struct Slot {
    state: Mutex<SlotState>,
}

impl Slot {
    /// Never held across an `.await`.
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A table handed out by the cache, with whether it was already past its TTL.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub table: Arc<ProviderRateTable>,
    pub stale: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// RateCache
// ─────────────────────────────────────────────────────────────────────────────

/// Per-base cache of provider rate tables with stampede protection.
pub struct RateCache {
    provider: Arc<dyn RateProvider>,
    config: CacheConfig,
    slots: DashMap<CurrencyCode, Arc<Slot>>,
}

impl RateCache {
    /// Creates a new, empty cache in front of `provider`.
    pub fn new(provider: Arc<dyn RateProvider>, config: CacheConfig) -> Self {
        Self {
            provider,
            config,
            slots: DashMap::new(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn slot(&self, base: &CurrencyCode) -> Arc<Slot> {
        self.slots.entry(base.clone()).or_default().clone()
    }

    /// Units of `target` per one unit of `base`.
    ///
    /// Populates the table for `base` first when it is missing, or stale
    /// under [`StalePolicy::Block`], then looks the target up once.
    pub async fn get_rate(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Decimal, CacheError> {
        let snapshot = self.acquire(base).await?;
        snapshot
            .table
            .rate_for(target)
            .ok_or_else(|| CacheError::RateUnavailable {
                base: base.clone(),
                target: target.clone(),
            })
    }

    /// Returns a usable table for `base`, populating if needed.
    pub async fn acquire(&self, base: &CurrencyCode) -> Result<CacheSnapshot, FetchError> {
        let slot = self.slot(base);
        let rx = {
            let mut state = slot.lock();
            if let Some(table) = state.table.clone() {
                if state.is_fresh(self.config.ttl) {
                    return Ok(CacheSnapshot {
                        table,
                        stale: false,
                    });
                }
                if self.config.stale_policy == StalePolicy::Revalidate {
                    self.join_or_spawn(&slot, &mut state, base);
                    tracing::debug!(base = %base, "Serving stale rate table while revalidating");
                    return Ok(CacheSnapshot { table, stale: true });
                }
            }
            self.join_or_spawn(&slot, &mut state, base)
        };

        let table = wait_for_outcome(rx, base).await?;
        Ok(CacheSnapshot {
            table,
            stale: false,
        })
    }

    /// Fetches a new table for `base`, or joins the fetch already running.
    ///
    /// On success the new table replaces the old one with a fresh TTL clock.
    /// On failure the slot keeps whatever it held before and every waiter
    /// receives the same error.
    pub async fn populate(
        &self,
        base: &CurrencyCode,
    ) -> Result<Arc<ProviderRateTable>, FetchError> {
        let slot = self.slot(base);
        let rx = {
            let mut state = slot.lock();
            self.join_or_spawn(&slot, &mut state, base)
        };
        wait_for_outcome(rx, base).await
    }

    fn join_or_spawn(
        &self,
        slot: &Arc<Slot>,
        state: &mut SlotState,
        base: &CurrencyCode,
    ) -> watch::Receiver<FetchOutcome> {
        if let Some(rx) = state.live_inflight() {
            return rx.clone();
        }

        let (tx, rx) = watch::channel(None);
        state.inflight = Some(rx.clone());

        tracing::debug!(base = %base, provider = self.provider.id(), "Populating rate table");
        tokio::spawn(run_fetch(
            self.provider.clone(),
            slot.clone(),
            base.clone(),
            self.config.fetch_timeout,
            tx,
        ));
        rx
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Invalidation and inspection
    // ─────────────────────────────────────────────────────────────────────────────

    /// Drops the installed table for `base`. Returns false if there was none.
    ///
    /// A population already in flight still completes and installs its table.
    pub fn invalidate(&self, base: &CurrencyCode) -> bool {
        let Some(slot) = self.slots.get(base).map(|s| s.clone()) else {
            return false;
        };
        let mut state = slot.lock();
        state.installed_at = None;
        state.table.take().is_some()
    }

    /// Drops every installed table.
    pub fn invalidate_all(&self) {
        for entry in self.slots.iter() {
            let mut state = entry.value().lock();
            state.table = None;
            state.installed_at = None;
        }
    }

    /// The installed table for `base`, without triggering a fetch.
    pub fn snapshot(&self, base: &CurrencyCode) -> Option<CacheSnapshot> {
        let slot = self.slots.get(base)?.clone();
        let state = slot.lock();
        let table = state.table.clone()?;
        Some(CacheSnapshot {
            table,
            stale: !state.is_fresh(self.config.ttl),
        })
    }

    /// State of every base the cache has seen, sorted by base.
    pub fn status(&self) -> Vec<CacheEntryStatus> {
        let mut entries: Vec<CacheEntryStatus> = self
            .slots
            .iter()
            .map(|entry| {
                let state = entry.value().lock();
                CacheEntryStatus {
                    base: entry.key().to_string(),
                    state: state.state(self.config.ttl),
                    fetched_at: state.table.as_ref().map(|t| t.fetched_at()),
                    rate_count: state.table.as_ref().map_or(0, |t| t.len()),
                }
            })
            .collect();
        entries.sort_by(|a, b| a.base.cmp(&b.base));
        entries
    }

    pub fn state_of(&self, base: &CurrencyCode) -> CacheState {
        self.slots
            .get(base)
            .map_or(CacheState::Empty, |slot| slot.lock().state(self.config.ttl))
    }
}

/// Body of the spawned population task.
async fn run_fetch(
    provider: Arc<dyn RateProvider>,
    slot: Arc<Slot>,
    base: CurrencyCode,
    fetch_timeout: Duration,
    tx: watch::Sender<FetchOutcome>,
) {
    let started = Instant::now();
    let outcome = match tokio::time::timeout(fetch_timeout, provider.fetch_rates(&base)).await {
        Ok(Ok(fetched)) => ProviderRateTable::from_fetched(&base, fetched, Utc::now()).map(Arc::new),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(FetchError::Timeout {
            base: base.to_string(),
            after_ms: fetch_timeout.as_millis() as u64,
        }),
    };

    {
        let mut state = slot.lock();
        if let Ok(table) = &outcome {
            state.table = Some(table.clone());
            state.installed_at = Some(Instant::now());
        }
        state.inflight = None;
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &outcome {
        Ok(table) => tracing::info!(
            base = %base,
            rates = table.len(),
            elapsed_ms,
            "Installed rate table"
        ),
        Err(e) => tracing::warn!(base = %base, elapsed_ms, error = %e, "Rate population failed"),
    }

    tx.send_replace(Some(outcome));
}

async fn wait_for_outcome(
    mut rx: watch::Receiver<FetchOutcome>,
    base: &CurrencyCode,
) -> Result<Arc<ProviderRateTable>, FetchError> {
    match rx.wait_for(|outcome| outcome.is_some()).await {
        Ok(outcome) => match &*outcome {
            Some(result) => result.clone(),
            None => Err(FetchError::Aborted(base.to_string())),
        },
        Err(_) => Err(FetchError::Aborted(base.to_string())),
    }
}
