use std::{borrow::Cow, ops::ControlFlow};

use super::{
    result::{CaseOutcome, CaseStatus, JudgeResult, Verdict},
    runner::{Execution, ProcessOutput},
};

fn crlf_to_lf(s: &str) -> Cow<'_, str> {
    if s.contains("\r\n") {
        Cow::Owned(s.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Compares outputs after converting CRLF to LF and trimming leading and trailing whitespace.
pub fn classify(output: &ProcessOutput, expected: &str) -> CaseStatus {
    if !output.exited_normally() {
        CaseStatus::RE
    } else if crlf_to_lf(&output.stdout).trim() != crlf_to_lf(expected).trim() {
        CaseStatus::WA
    } else {
        CaseStatus::AC
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Running,
    Done(Verdict),
}

/// Folds per-testcase executions into one verdict, stopping at the first non-AC case.
#[derive(Debug)]
pub struct Reducer {
    state: State,
    outcomes: Vec<CaseOutcome>,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer {
    pub fn new() -> Self {
        Self {
            state: State::Running,
            outcomes: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done(_))
    }

    /// Records the execution of testcase `case_name`.
    /// Returns `Break` once the verdict is decided; further feeds are ignored.
    pub fn feed(&mut self, case_name: &str, expected: &str, exec: Execution) -> ControlFlow<()> {
        if self.is_done() {
            return ControlFlow::Break(());
        }

        let status = match exec {
            Execution::Completed(output) => classify(&output, expected),
            Execution::TimedOut { elapsed } => {
                log::info!("Testcase {}: TLE [{}ms]", case_name, elapsed.as_millis());
                return self.finish_with(Verdict::TimeLimitExceeded);
            }
            Execution::EnvironmentFailure(e) => {
                log::error!("Testcase {}: execution environment failed: {:#}", case_name, e);
                return self.finish_with(Verdict::SystemError);
            }
        };

        log::debug!("Testcase {}: {}", case_name, status);
        self.outcomes.push(CaseOutcome::new(case_name, status));

        match Verdict::failed_on(status, case_name) {
            Some(verdict) => self.finish_with(verdict),
            None => ControlFlow::Continue(()),
        }
    }

    fn finish_with(&mut self, verdict: Verdict) -> ControlFlow<()> {
        self.state = State::Done(verdict);
        ControlFlow::Break(())
    }

    pub fn finish(self) -> JudgeResult {
        let verdict = match self.state {
            State::Running => Verdict::Accepted,
            State::Done(verdict) => verdict,
        };
        JudgeResult {
            verdict,
            details: self.outcomes,
        }
    }
}
