use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::client::AssessmentApi;
use crate::error::{CheckError, Result};
use crate::types::Assessment;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// One hour at the default interval.
pub const DEFAULT_MAX_POLLS: u32 = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two status requests.
    pub interval: Duration,
    /// Status requests allowed before giving up with `PollTimeout`.
    pub max_polls: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// Progress notification derived from one status snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Reporting moved to endpoint `number` (1-based).
    Header { number: usize },
    Line { ip_address: String, port: i32, progress: i32 },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Header { number } => {
                write!(f, "\n----- PROGRESS ON ENDPOINT {number} -----")
            }
            ProgressEvent::Line { ip_address, port, progress } => {
                write!(f, "      {ip_address}:{port} - {progress}%")
            }
        }
    }
}

/// Tracks which endpoint is being reported across polls.
///
/// Endpoints are reported one at a time in discovery order. The cursor only
/// moves forward, and only once the current endpoint is complete and a later
/// one exists, so it never points past the end of the snapshot it is given.
#[derive(Debug, Clone, Default)]
pub struct PollerCursor {
    current: usize,
    announced: Option<usize>,
    completion_shown: bool,
}

impl PollerCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the endpoint currently reported.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Feed a fresh snapshot and collect the events it produces.
    pub fn observe(&mut self, assessment: &Assessment) -> Vec<ProgressEvent> {
        let endpoints = &assessment.endpoints;
        let mut events = Vec::new();
        if endpoints.is_empty() {
            return events;
        }
        // The list is not expected to shrink, but a snapshot must never be indexed past its end.
        if self.current >= endpoints.len() {
            self.current = endpoints.len() - 1;
        }

        loop {
            if self.announced != Some(self.current) {
                events.push(ProgressEvent::Header { number: self.current + 1 });
                self.announced = Some(self.current);
                self.completion_shown = false;
            }

            let endpoint = &endpoints[self.current];
            let complete = endpoint.is_complete();
            if !(complete && self.completion_shown) {
                events.push(ProgressEvent::Line {
                    ip_address: endpoint.ip_address.clone(),
                    port: assessment.port,
                    progress: endpoint.progress,
                });
            }
            if !complete {
                break;
            }
            self.completion_shown = true;
            if self.current + 1 >= endpoints.len() {
                break;
            }
            self.current += 1;
        }
        events
    }
}

/// Drives one assessment from start to a terminal status.
pub struct Poller<'a, A> {
    api: &'a A,
    settings: PollSettings,
}

impl<'a, A: AssessmentApi> Poller<'a, A> {
    pub fn new(api: &'a A, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    /// Ask the service for a new assessment. The returned snapshot may already be
    /// terminal when the service serves cached results.
    pub async fn start(&self, host: &str, publish: bool) -> Result<Assessment> {
        info!(host, publish, "starting assessment");
        let assessment = self.api.start_assessment(host, publish).await?;
        debug!(host, status = %assessment.status, "start returned");
        Ok(assessment)
    }

    pub async fn poll_once(&self, host: &str) -> Result<Assessment> {
        self.api.check_assessment(host).await
    }

    /// Poll until READY or ERROR, reporting endpoint progress through `on_progress`.
    ///
    /// The terminal snapshot is returned as fetched; no request follows it.
    pub async fn wait_until_terminal<F>(&self, host: &str, mut on_progress: F) -> Result<Assessment>
    where
        F: FnMut(ProgressEvent),
    {
        let mut cursor = PollerCursor::new();
        let mut attempts = 0u32;
        let timed_out = |attempts| CheckError::PollTimeout {
            host: host.to_string(),
            attempts,
        };
        if self.settings.max_polls == 0 {
            return Err(timed_out(0));
        }
        loop {
            attempts += 1;

            let assessment = self.poll_once(host).await?;
            debug!(
                host,
                attempt = attempts,
                status = %assessment.status,
                endpoints = assessment.endpoints.len(),
                "polled assessment"
            );
            for event in cursor.observe(&assessment) {
                on_progress(event);
            }
            if assessment.status.is_terminal() {
                return Ok(assessment);
            }
            // The last allowed poll is not followed by a delay.
            if attempts >= self.settings.max_polls {
                return Err(timed_out(attempts));
            }
            tokio::time::sleep(self.settings.interval).await;
        }
    }
}
