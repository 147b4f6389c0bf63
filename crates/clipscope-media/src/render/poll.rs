//! Render job polling.
//!
//! Polling is split into a pure transition function ([`advance`]) and a
//! driver ([`poll_until_settled`]) that sleeps through an injectable
//! [`Clock`], so the state machine can be tested without real time.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use clipscope_models::{RenderJob, RenderStatus};

use super::{RenderObservation, RenderService};

/// Poll loop state.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Pending { attempts: u32 },
    Completed(String),
    Failed,
    TimedOut,
}

impl PollState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, PollState::Pending { .. })
    }

    /// Result URL, if the job completed.
    pub fn into_url(self) -> Option<String> {
        match self {
            PollState::Completed(url) => Some(url),
            _ => None,
        }
    }
}

/// Interval and attempt budget of a poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

/// Compute the next state from one observation.
///
/// `None` is a failed status request; it consumes an attempt like any other
/// non-terminal observation.
pub fn advance(state: PollState, observation: Option<&RenderObservation>, policy: &PollPolicy) -> PollState {
    let attempts = match state {
        PollState::Pending { attempts } => attempts + 1,
        settled => return settled,
    };

    match observation {
        Some(RenderObservation {
            status: RenderStatus::Done,
            url: Some(url),
        }) => PollState::Completed(url.clone()),
        Some(RenderObservation {
            status: RenderStatus::Done | RenderStatus::Failed,
            ..
        }) => PollState::Failed,
        _ if attempts >= policy.max_attempts => PollState::TimedOut,
        _ => PollState::Pending { attempts },
    }
}

/// Source of delays for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Poll `job` until it settles; returns the result URL on completion.
///
/// Waits one interval before every status request. The job record is kept in
/// sync with the last observation.
pub async fn poll_until_settled(
    service: &dyn RenderService,
    clock: &dyn Clock,
    policy: &PollPolicy,
    job: &mut RenderJob,
) -> Option<String> {
    let mut state = PollState::Pending { attempts: 0 };

    while !state.is_settled() {
        clock.sleep(policy.interval).await;

        let observation = match service.status(&job.id).await {
            Ok(observation) => Some(observation),
            Err(e) => {
                debug!(job_id = %job.id, error = %e, "Render status request failed");
                None
            }
        };

        if let Some(observation) = &observation {
            job.status = observation.status;
        }
        state = advance(state, observation.as_ref(), policy);
        if let PollState::Pending { attempts } = state {
            job.attempts = attempts;
        } else {
            job.attempts += 1;
        }
    }

    match &state {
        PollState::Completed(url) => job.result_url = Some(url.clone()),
        PollState::Failed => {
            job.status = RenderStatus::Failed;
            warn!(job_id = %job.id, offset = ?job.offset, "Render job failed");
        }
        PollState::TimedOut => {
            warn!(
                job_id = %job.id,
                attempts = job.attempts,
                "Render job did not finish within the poll budget"
            );
        }
        PollState::Pending { .. } => {}
    }

    state.into_url()
}
