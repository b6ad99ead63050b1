use std::fmt;

use serde::{Serialize, Serializer};

/// Classification of a single testcase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString,
)]
pub enum CaseStatus {
    AC,
    WA,
    RE,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseOutcome {
    pub test: String,
    pub status: CaseStatus,
}

impl CaseOutcome {
    pub fn new(test: impl Into<String>, status: CaseStatus) -> Self {
        Self {
            test: test.into(),
            status,
        }
    }
}

/// Final verdict of one submission.
///
/// `Display` and `Serialize` both produce the externally visible string,
/// e.g. `ACCEPTED`, `WA on 03`, `TLE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verdict {
    Accepted,
    WrongAnswer(String),
    RuntimeError(String),
    TimeLimitExceeded,
    SystemError,
    TestcasesMissing,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// The verdict for a testcase that finished with a non-AC status.
    pub fn failed_on(status: CaseStatus, case_name: impl Into<String>) -> Option<Self> {
        match status {
            CaseStatus::AC => None,
            CaseStatus::WA => Some(Verdict::WrongAnswer(case_name.into())),
            CaseStatus::RE => Some(Verdict::RuntimeError(case_name.into())),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Verdict::*;
        match self {
            Accepted => write!(f, "ACCEPTED"),
            WrongAnswer(case) => write!(f, "{} on {}", CaseStatus::WA, case),
            RuntimeError(case) => write!(f, "{} on {}", CaseStatus::RE, case),
            TimeLimitExceeded => write!(f, "TLE"),
            SystemError => write!(f, "System Error"),
            TestcasesMissing => write!(f, "Error: TC Missing"),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgeResult {
    pub verdict: Verdict,
    pub details: Vec<CaseOutcome>,
}

impl JudgeResult {
    pub fn without_details(verdict: Verdict) -> Self {
        Self {
            verdict,
            details: Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn verdict_display() {
        assert_eq!(Verdict::Accepted.to_string(), "ACCEPTED");
        assert_eq!(Verdict::WrongAnswer("1".into()).to_string(), "WA on 1");
        assert_eq!(Verdict::RuntimeError("sample2".into()).to_string(), "RE on sample2");
        assert_eq!(Verdict::TimeLimitExceeded.to_string(), "TLE");
        assert_eq!(Verdict::SystemError.to_string(), "System Error");
        assert_eq!(Verdict::TestcasesMissing.to_string(), "Error: TC Missing");
    }

    #[test]
    fn case_status_parse() {
        assert_eq!("WA".parse::<CaseStatus>().unwrap(), CaseStatus::WA);
        assert!("TLE".parse::<CaseStatus>().is_err());
    }

    #[test]
    fn judge_result_json_shape() {
        let res = JudgeResult {
            verdict: Verdict::WrongAnswer("2".into()),
            details: vec![
                CaseOutcome::new("1", CaseStatus::AC),
                CaseOutcome::new("2", CaseStatus::WA),
            ],
        };
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "verdict": "WA on 2",
                "details": [
                    { "test": "1", "status": "AC" },
                    { "test": "2", "status": "WA" },
                ],
            })
        );
    }

    #[test]
    fn failed_on_ac_is_none() {
        assert_eq!(Verdict::failed_on(CaseStatus::AC, "1"), None);
        assert_eq!(
            Verdict::failed_on(CaseStatus::RE, "1"),
            Some(Verdict::RuntimeError("1".into()))
        );
    }
}
