//! End-to-end run: capacity check, start, poll if needed.
use std::time::Duration;

use tracing::{info, warn};

use crate::client::AssessmentApi;
use crate::error::{CheckError, Result};
use crate::poller::{PollSettings, Poller, ProgressEvent};
use crate::types::{Assessment, ServiceInfo};

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub domain: String,
    /// Publish the result on the public SSL Labs boards.
    pub publish: bool,
    pub poll: PollSettings,
}

impl CheckOptions {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            publish: false,
            poll: PollSettings::default(),
        }
    }
}

/// What happened during a run, in order, for the caller to display.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckEvent {
    ServiceReachable(ServiceInfo),
    /// Capacity check passed; the start request is about to be sent.
    Starting,
    Started(Assessment),
    Progress(ProgressEvent),
}

/// Final outcome of a successful run. `assessment` is always READY or ERROR.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub service: ServiceInfo,
    pub assessment: Assessment,
    /// False when the start call already returned a terminal (cached) result.
    pub polled: bool,
}

/// Run one assessment for `options.domain` and return its terminal snapshot.
///
/// Any error aborts the run; nothing is retried.
pub async fn run_check<A, F>(api: &A, options: &CheckOptions, mut on_event: F) -> Result<CheckReport>
where
    A: AssessmentApi,
    F: FnMut(CheckEvent),
{
    let service = api.service_info().await?;
    on_event(CheckEvent::ServiceReachable(service.clone()));
    if service.at_capacity() {
        warn!(
            current = service.current_assessments,
            max = service.max_assessments,
            "assessment capacity reached"
        );
        return Err(CheckError::CapacityExceeded {
            current: service.current_assessments,
            max: service.max_assessments,
        });
    }

    if service.new_assessment_cool_off > 0 {
        info!(millis = service.new_assessment_cool_off, "waiting for cool-off before starting");
        tokio::time::sleep(Duration::from_millis(service.new_assessment_cool_off as u64)).await;
    }

    on_event(CheckEvent::Starting);
    let poller = Poller::new(api, options.poll);
    let started = poller.start(&options.domain, options.publish).await?;
    on_event(CheckEvent::Started(started.clone()));

    if started.status.is_terminal() {
        info!(host = %options.domain, status = %started.status, "using cached result");
        return Ok(CheckReport { service, assessment: started, polled: false });
    }

    let assessment = poller
        .wait_until_terminal(&options.domain, |event| on_event(CheckEvent::Progress(event)))
        .await?;
    Ok(CheckReport { service, assessment, polled: true })
}
