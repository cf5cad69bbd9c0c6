use serde::{Deserialize, Serialize};

/// Snapshot of the assessment service returned by `/info`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceInfo {
    /// Protocol version of the assessment API.
    pub version: String,
    pub criteria_version: String,
    pub max_assessments: i32,
    pub current_assessments: i32,
    /// Milliseconds the client must wait before starting a new assessment.
    pub new_assessment_cool_off: i64,
    pub messages: Vec<String>,
}

impl ServiceInfo {
    /// True when the service will not accept another concurrent assessment.
    pub fn at_capacity(&self) -> bool {
        self.current_assessments >= self.max_assessments
    }
}

/// Lifecycle state of an assessment as reported by the service.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentStatus {
    Dns,
    InProgress,
    Ready,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AssessmentStatus {
    /// READY and ERROR end polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, AssessmentStatus::Ready | AssessmentStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentStatus::Dns => "DNS",
            AssessmentStatus::InProgress => "IN_PROGRESS",
            AssessmentStatus::Ready => "READY",
            AssessmentStatus::Error => "ERROR",
            AssessmentStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One host assessment (`host` object in the API). Each poll replaces it wholesale.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Assessment {
    pub host: String,
    pub port: i32,
    pub protocol: String,
    pub is_public: bool,
    pub status: AssessmentStatus,
    pub status_message: String,
    /// Unix epoch, milliseconds.
    pub start_time: i64,
    /// Unix epoch, milliseconds.
    pub test_time: i64,
    pub engine_version: String,
    pub criteria_version: String,
    pub endpoints: Vec<Endpoint>,
}

/// One server (IP address) backing the assessed host.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoint {
    pub ip_address: String,
    pub server_name: String,
    pub status_message: String,
    pub status_details: String,
    pub grade: String,
    pub grade_trust_ignored: String,
    pub has_warnings: bool,
    /// -1 until the endpoint assessment starts, then 0..=100.
    pub progress: i32,
    /// Milliseconds.
    pub duration: i64,
    /// Seconds.
    pub eta: i64,
}

impl Endpoint {
    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_strings_decode_to_unknown() {
        let a: Assessment = serde_json::from_str(r#"{"host":"x","status":"QUEUED"}"#).unwrap();
        assert_eq!(a.status, AssessmentStatus::Unknown);
        assert!(a.endpoints.is_empty());
    }

    #[test]
    fn terminal_statuses() {
        assert!(AssessmentStatus::Ready.is_terminal());
        assert!(AssessmentStatus::Error.is_terminal());
        assert!(!AssessmentStatus::Dns.is_terminal());
        assert!(!AssessmentStatus::InProgress.is_terminal());
        assert!(!AssessmentStatus::Unknown.is_terminal());
    }

    #[test]
    fn capacity_is_inclusive() {
        let mut info = ServiceInfo { max_assessments: 20, current_assessments: 19, ..Default::default() };
        assert!(!info.at_capacity());
        info.current_assessments = 20;
        assert!(info.at_capacity());
    }
}
