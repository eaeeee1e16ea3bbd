//! Epoch service for observing epoch transitions
//!
//! The vault's epoch index is a pure function of time, so nothing has to be
//! stored for epochs to advance. This service samples the clock on a ticker
//! and broadcasts an event whenever the observed index moves forward.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use vault_core_types::{Epoch, EpochClock, EpochError, EpochInfo, Timestamp};

use crate::error::ServiceResult;
use crate::service::unix_now;

/// Epoch transition event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpochEvent {
    /// A later epoch was observed
    EpochStarted {
        epoch: Epoch,
        start: Timestamp,
        end: Timestamp,
    },
}

/// Epoch ticker configuration
#[derive(Debug, Clone)]
pub struct EpochConfig {
    /// Ticker period in milliseconds
    pub tick_interval_ms: u64,
    /// Whether to sample the clock on a ticker
    pub auto_advance: bool,
}

impl Default for EpochConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            auto_advance: true,
        }
    }
}

#[derive(Default)]
struct EpochState {
    observed: Option<EpochInfo>,
    last_sample: Option<Timestamp>,
    transitions: u64,
}

/// Epoch manager tracking the latest observed epoch
pub struct EpochManager {
    config: EpochConfig,
    clock: EpochClock,
    state: Arc<RwLock<EpochState>>,
    event_sender: broadcast::Sender<EpochEvent>,
}

impl EpochManager {
    pub fn new(config: EpochConfig, clock: EpochClock) -> (Self, broadcast::Receiver<EpochEvent>) {
        let (event_sender, event_receiver) = broadcast::channel(100);

        let manager = Self {
            config,
            clock,
            state: Arc::new(RwLock::new(EpochState::default())),
            event_sender,
        };

        (manager, event_receiver)
    }

    /// Start sampling the wall clock
    pub fn start_auto_advance(&self) -> Option<JoinHandle<()>> {
        if !self.config.auto_advance {
            return None;
        }

        let clock = self.clock;
        let state = self.state.clone();
        let event_sender = self.event_sender.clone();
        let period = Duration::from_millis(self.config.tick_interval_ms.max(1));

        Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                if let Err(e) = Self::advance_internal(&clock, &state, &event_sender, unix_now()).await {
                    log::error!("Failed to advance epoch: {:?}", e);
                }
            }
        }))
    }

    /// Sample the clock at `now`
    pub async fn advance_to(&self, now: Timestamp) -> ServiceResult<Option<EpochEvent>> {
        Self::advance_internal(&self.clock, &self.state, &self.event_sender, now).await
    }

    async fn advance_internal(
        clock: &EpochClock,
        state: &Arc<RwLock<EpochState>>,
        event_sender: &broadcast::Sender<EpochEvent>,
        now: Timestamp,
    ) -> ServiceResult<Option<EpochEvent>> {
        let info = match clock.epoch_at(now) {
            Ok(info) => info,
            Err(EpochError::InvalidTime { origin, .. }) => {
                log::debug!("Clock origin {} not reached at {}", origin, now);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut epoch_state = state.write().await;
        epoch_state.last_sample = Some(now);

        if let Some(observed) = epoch_state.observed {
            if info.epoch <= observed.epoch {
                return Ok(None);
            }
        }

        epoch_state.observed = Some(info);
        epoch_state.transitions += 1;

        let event = EpochEvent::EpochStarted {
            epoch: info.epoch,
            start: info.start,
            end: info.end,
        };
        log::info!("Epoch {} started at {}, ends at {}", info.epoch, info.start, info.end);

        // No subscribers is not an error
        let _ = event_sender.send(event.clone());

        Ok(Some(event))
    }

    /// Latest observed epoch
    pub async fn epoch_info(&self) -> Option<EpochInfo> {
        self.state.read().await.observed
    }
}

/// Main epoch service providing high-level epoch tracking
pub struct EpochService {
    manager: Arc<EpochManager>,
    event_receiver: Arc<RwLock<broadcast::Receiver<EpochEvent>>>,
}

impl EpochService {
    pub fn new(config: EpochConfig, clock: EpochClock) -> Self {
        let (manager, event_receiver) = EpochManager::new(config, clock);

        Self {
            manager: Arc::new(manager),
            event_receiver: Arc::new(RwLock::new(event_receiver)),
        }
    }

    /// Start the ticker, if enabled
    pub fn start(&self) -> Option<JoinHandle<()>> {
        self.manager.start_auto_advance()
    }

    /// Manually sample the clock
    pub async fn advance_to(&self, now: Timestamp) -> ServiceResult<Option<EpochEvent>> {
        self.manager.advance_to(now).await
    }

    pub async fn epoch_info(&self) -> Option<EpochInfo> {
        self.manager.epoch_info().await
    }

    pub async fn current_epoch(&self) -> Option<Epoch> {
        self.epoch_info().await.map(|info| info.epoch)
    }

    /// Subscribe to epoch events
    pub fn subscribe(&self) -> broadcast::Receiver<EpochEvent> {
        self.manager.event_sender.subscribe()
    }

    /// Wait for next epoch event
    pub async fn next_event(&self) -> Option<EpochEvent> {
        let mut receiver = self.event_receiver.write().await;
        receiver.recv().await.ok()
    }

    pub async fn get_stats(&self) -> EpochStats {
        let state = self.manager.state.read().await;

        EpochStats {
            current_epoch: state.observed.map(|info| info.epoch),
            last_sample: state.last_sample,
            transitions: state.transitions,
            epoch_duration: self.manager.clock.epoch_duration(),
            tick_interval_ms: self.manager.config.tick_interval_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EpochStats {
    pub current_epoch: Option<Epoch>,
    pub last_sample: Option<Timestamp>,
    pub transitions: u64,
    pub epoch_duration: u64,
    pub tick_interval_ms: u64,
}
