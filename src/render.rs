use std::fmt::Write as _;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::{CheckError, Result};
use crate::types::{Assessment, AssessmentStatus};

/// Render a terminal assessment using the local UTC offset (UTC if it cannot be determined).
pub fn render(assessment: &Assessment) -> Result<String> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    render_with_offset(assessment, offset)
}

/// Render a terminal assessment, showing the test time at `offset`.
///
/// Fails with `NotTerminal` for anything but READY or ERROR.
pub fn render_with_offset(assessment: &Assessment, offset: UtcOffset) -> Result<String> {
    let mut out = String::new();
    match assessment.status {
        AssessmentStatus::Ready => {
            push_header(&mut out, assessment);
            let _ = writeln!(out, "Test completed: {}", format_test_time(assessment.test_time, offset));
            for (i, endpoint) in assessment.endpoints.iter().enumerate() {
                let _ = writeln!(out, "Endpoint {}:", i + 1);
                let _ = writeln!(out, "  IP Address: {}", endpoint.ip_address);
                let _ = writeln!(out, "  Grade: {}", endpoint.grade);
                let _ = writeln!(out, "  Status Message: {}", endpoint.status_message);
                let _ = writeln!(out, "  Has Warnings: {}", endpoint.has_warnings);
                out.push('\n');
            }
        }
        AssessmentStatus::Error => {
            push_header(&mut out, assessment);
            let _ = writeln!(out, "Assessment failed: {}", assessment.status_message);
        }
        other => return Err(CheckError::NotTerminal(other)),
    }
    Ok(out)
}

fn push_header(out: &mut String, assessment: &Assessment) {
    out.push_str("Assessment Results:\n");
    let _ = writeln!(out, "Domain: {}", assessment.host);
    let _ = writeln!(out, "Status: {}", assessment.status);
}

/// `testTime` is Unix epoch milliseconds; shown to the second.
fn format_test_time(millis: i64, offset: UtcOffset) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::from_unix_timestamp(millis.div_euclid(1000))
        .ok()
        .and_then(|t| t.to_offset(offset).format(format).ok())
        .unwrap_or_else(|| format!("<invalid timestamp {millis}>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Endpoint;

    #[test]
    fn test_time_is_formatted_at_offset() {
        // 2024-01-02 03:04:05.678 UTC
        let millis = 1_704_164_645_678;
        assert_eq!(format_test_time(millis, UtcOffset::UTC), "2024-01-02 03:04:05");
        let plus_two = UtcOffset::from_hms(2, 0, 0).unwrap();
        assert_eq!(format_test_time(millis, plus_two), "2024-01-02 05:04:05");
    }

    #[test]
    fn ready_lists_endpoints_in_order() {
        let assessment = Assessment {
            host: "example.com".into(),
            status: AssessmentStatus::Ready,
            test_time: 0,
            endpoints: vec![
                Endpoint { ip_address: "10.0.0.1".into(), grade: "A+".into(), ..Default::default() },
                Endpoint {
                    ip_address: "10.0.0.2".into(),
                    grade: "B".into(),
                    has_warnings: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let text = render_with_offset(&assessment, UtcOffset::UTC).unwrap();
        assert!(text.contains("Test completed: 1970-01-01 00:00:00\n"));
        let first = text.find("Endpoint 1:\n  IP Address: 10.0.0.1\n  Grade: A+").unwrap();
        let second = text.find("Endpoint 2:\n  IP Address: 10.0.0.2\n  Grade: B").unwrap();
        assert!(first < second);
        assert!(text.contains("  Has Warnings: true\n"));
    }

    #[test]
    fn error_shows_status_message() {
        let assessment = Assessment {
            host: "nope.invalid".into(),
            status: AssessmentStatus::Error,
            status_message: "Unable to resolve domain name".into(),
            ..Default::default()
        };
        let text = render_with_offset(&assessment, UtcOffset::UTC).unwrap();
        assert_eq!(
            text,
            "Assessment Results:\nDomain: nope.invalid\nStatus: ERROR\nAssessment failed: Unable to resolve domain name\n"
        );
    }

    #[test]
    fn local_render_matches_explicit_offset_for_errors() {
        let assessment = Assessment { status: AssessmentStatus::Error, ..Default::default() };
        assert_eq!(
            render(&assessment).unwrap(),
            render_with_offset(&assessment, UtcOffset::UTC).unwrap()
        );
    }

    #[test]
    fn running_assessment_is_rejected() {
        let assessment = Assessment { status: AssessmentStatus::InProgress, ..Default::default() };
        assert!(matches!(
            render_with_offset(&assessment, UtcOffset::UTC),
            Err(CheckError::NotTerminal(AssessmentStatus::InProgress))
        ));
    }
}
