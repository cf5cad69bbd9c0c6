#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use ssllabs_check::error::Result;
use ssllabs_check::types::{Assessment, AssessmentStatus, Endpoint, ServiceInfo};
use ssllabs_check::{AssessmentApi, CheckError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Info,
    Start { host: String, publish: bool },
    Check { host: String },
}

/// In-memory service answering from a fixed script and recording every call.
pub struct ScriptedApi {
    pub info: ServiceInfo,
    pub start: Assessment,
    polls: Mutex<VecDeque<Assessment>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedApi {
    pub fn new(info: ServiceInfo, start: Assessment, polls: Vec<Assessment>) -> Self {
        Self {
            info,
            start,
            polls: Mutex::new(polls.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining_polls(&self) -> usize {
        self.polls.lock().unwrap().len()
    }
}

impl AssessmentApi for ScriptedApi {
    async fn service_info(&self) -> Result<ServiceInfo> {
        self.calls.lock().unwrap().push(Call::Info);
        Ok(self.info.clone())
    }

    async fn start_assessment(&self, host: &str, publish: bool) -> Result<Assessment> {
        self.calls.lock().unwrap().push(Call::Start { host: host.into(), publish });
        Ok(self.start.clone())
    }

    async fn check_assessment(&self, host: &str) -> Result<Assessment> {
        self.calls.lock().unwrap().push(Call::Check { host: host.into() });
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CheckError::UnexpectedStatus("script exhausted".into()))
    }
}

pub fn service(max: i32, current: i32) -> ServiceInfo {
    ServiceInfo {
        version: "1.0.0".into(),
        criteria_version: "2009q".into(),
        max_assessments: max,
        current_assessments: current,
        new_assessment_cool_off: 0,
        messages: vec![],
    }
}

pub fn assessment(status: AssessmentStatus, endpoints: Vec<Endpoint>) -> Assessment {
    Assessment {
        host: "example.com".into(),
        port: 443,
        protocol: "http".into(),
        status,
        endpoints,
        ..Default::default()
    }
}

pub fn endpoint(ip: &str, progress: i32) -> Endpoint {
    Endpoint {
        ip_address: ip.into(),
        progress,
        ..Default::default()
    }
}
