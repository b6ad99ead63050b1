//! Judging entry point: loads the problem, runs the submission on each testcase
//! in order and reduces the executions to a verdict.

use std::ops::ControlFlow;

use crate::problem::{LoadError, ProblemLoader};
use crate::testing::{ExecutionSupervisor, JudgeResult, Reducer, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub problem_id: String,
    pub source_code: String,
}

impl Submission {
    pub fn new(problem_id: impl Into<String>, source_code: impl Into<String>) -> Self {
        Self {
            problem_id: problem_id.into(),
            source_code: source_code.into(),
        }
    }
}

/// Judges `submission`. Never fails: every error becomes a verdict.
///
/// Testcases run one at a time in name order. Judging stops at the first
/// testcase that is not AC.
pub async fn judge<L, S>(loader: &L, supervisor: &S, submission: &Submission) -> JudgeResult
where
    L: ProblemLoader + ?Sized,
    S: ExecutionSupervisor + ?Sized,
{
    let problem_id = &submission.problem_id;

    let problem = match loader.load(problem_id).await {
        Ok(problem) => problem,
        Err(LoadError::TestcasesMissing(_)) => {
            log::warn!("No testcases for problem '{}'", problem_id);
            return JudgeResult::without_details(Verdict::TestcasesMissing);
        }
        Err(e) => {
            log::error!("Failed to load problem '{}': {:#}", problem_id, e);
            return JudgeResult::without_details(Verdict::SystemError);
        }
    };

    let program = match supervisor.materialize(&submission.source_code) {
        Ok(program) => program,
        Err(e) => {
            log::error!("Failed to prepare program: {:#}", e);
            return JudgeResult::without_details(Verdict::SystemError);
        }
    };

    log::info!(
        "Judging problem '{}' ({} testcases, time limit {}ms)",
        problem.id,
        problem.testcases.len(),
        problem.time_limit.as_millis()
    );

    let mut reducer = Reducer::new();
    for t in &problem.testcases {
        let exec = supervisor
            .execute(&program, &t.input, problem.time_limit)
            .await;
        if let ControlFlow::Break(()) = reducer.feed(&t.name, &t.expected, exec) {
            break;
        }
    }
    // the program file is removed here, on every path out of the loop
    drop(program);

    let res = reducer.finish();
    log::info!("Problem '{}': {}", problem.id, res.verdict);
    res
}

#[cfg(test)]
mod test {
    use std::{sync::Mutex, time::Duration};

    use async_trait::async_trait;

    use super::*;
    use crate::problem::{DirProblemLoader, OnMemoryProblemLoader, Problem};
    use crate::testing::{
        CaseOutcome, CaseStatus, Execution, ProcessOutput, ProcessSupervisor, ProgramArtifact,
        Testcase,
    };

    /// Answers each input from a script and records what was run.
    #[derive(Default)]
    struct FakeSupervisor {
        script: Vec<(&'static str, Execution)>,
        executed: Mutex<Vec<String>>,
        artifact_path: Mutex<Option<std::path::PathBuf>>,
    }

    impl FakeSupervisor {
        fn new(script: impl IntoIterator<Item = (&'static str, Execution)>) -> Self {
            Self {
                script: script.into_iter().collect(),
                ..Default::default()
            }
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    fn clone_exec(exec: &Execution) -> Execution {
        match exec {
            Execution::Completed(out) => Execution::Completed(out.clone()),
            Execution::TimedOut { elapsed } => Execution::TimedOut { elapsed: *elapsed },
            Execution::EnvironmentFailure(e) => {
                Execution::EnvironmentFailure(anyhow::anyhow!("{:#}", e))
            }
        }
    }

    #[async_trait]
    impl ExecutionSupervisor for FakeSupervisor {
        fn materialize(&self, source_code: &str) -> anyhow::Result<ProgramArtifact> {
            let program = ProgramArtifact::materialize(source_code, ".txt")?;
            *self.artifact_path.lock().unwrap() = Some(program.path().to_owned());
            Ok(program)
        }

        async fn execute(&self, _: &ProgramArtifact, input: &str, _: Duration) -> Execution {
            self.executed.lock().unwrap().push(input.to_owned());
            let (_, exec) = self
                .script
                .iter()
                .find(|(i, _)| *i == input)
                .expect("unscripted input");
            clone_exec(exec)
        }
    }

    fn prints(stdout: &str) -> Execution {
        Execution::Completed(ProcessOutput {
            status: Some(0),
            stdout: stdout.to_owned(),
            stderr: String::new(),
            elapsed: Duration::from_millis(1),
        })
    }

    fn crashes() -> Execution {
        Execution::Completed(ProcessOutput {
            status: Some(1),
            stdout: String::new(),
            stderr: "Traceback".to_owned(),
            elapsed: Duration::from_millis(1),
        })
    }

    fn loader_with_cases(cases: &[(&str, &str, &str)]) -> OnMemoryProblemLoader {
        [Problem {
            id: "p".into(),
            time_limit: Duration::from_secs(2),
            testcases: cases
                .iter()
                .map(|&(name, input, expected)| Testcase::new(name, input, expected))
                .collect(),
        }]
        .into_iter()
        .collect()
    }

    fn outcome(test: &str, status: CaseStatus) -> CaseOutcome {
        CaseOutcome::new(test, status)
    }

    #[tokio::test]
    async fn all_pass_is_accepted_in_name_order() {
        let loader = loader_with_cases(&[("c", "in-c", "C"), ("a", "in-a", "A"), ("b", "in-b", "B")]);
        let sv = FakeSupervisor::new([("in-a", prints("A\n")), ("in-b", prints("B")), ("in-c", prints(" C "))]);

        let res = judge(&loader, &sv, &Submission::new("p", "code")).await;

        assert_eq!(res.verdict, Verdict::Accepted);
        assert_eq!(
            res.details,
            [outcome("a", CaseStatus::AC), outcome("b", CaseStatus::AC), outcome("c", CaseStatus::AC)]
        );
        assert_eq!(sv.executed(), ["in-a", "in-b", "in-c"]);
    }

    #[tokio::test]
    async fn wa_short_circuits() {
        let loader = loader_with_cases(&[("1", "i1", "x"), ("2", "i2", "y"), ("3", "i3", "z")]);
        let sv = FakeSupervisor::new([("i1", prints("x")), ("i2", prints("nope")), ("i3", prints("z"))]);

        let res = judge(&loader, &sv, &Submission::new("p", "code")).await;

        assert_eq!(res.verdict.to_string(), "WA on 2");
        assert_eq!(res.details, [outcome("1", CaseStatus::AC), outcome("2", CaseStatus::WA)]);
        assert_eq!(sv.executed(), ["i1", "i2"]);
    }

    #[tokio::test]
    async fn re_short_circuits() {
        let loader = loader_with_cases(&[("1", "i1", "x"), ("2", "i2", "y")]);
        let sv = FakeSupervisor::new([("i1", crashes()), ("i2", prints("y"))]);

        let res = judge(&loader, &sv, &Submission::new("p", "code")).await;

        assert_eq!(res.verdict.to_string(), "RE on 1");
        assert_eq!(res.details, [outcome("1", CaseStatus::RE)]);
        assert_eq!(sv.executed(), ["i1"]);
    }

    #[tokio::test]
    async fn tle_short_circuits_without_outcome() {
        let loader = loader_with_cases(&[("1", "i1", "x"), ("2", "i2", "y"), ("3", "i3", "z")]);
        let sv = FakeSupervisor::new([
            ("i1", prints("x")),
            ("i2", Execution::TimedOut { elapsed: Duration::from_secs(2) }),
            ("i3", prints("z")),
        ]);

        let res = judge(&loader, &sv, &Submission::new("p", "code")).await;

        assert_eq!(res.verdict, Verdict::TimeLimitExceeded);
        assert_eq!(res.details, [outcome("1", CaseStatus::AC)]);
        assert_eq!(sv.executed(), ["i1", "i2"]);
    }

    #[tokio::test]
    async fn environment_failure_is_system_error_and_releases_artifact() {
        let loader = loader_with_cases(&[("1", "i1", "x"), ("2", "i2", "y")]);
        let sv = FakeSupervisor::new([
            ("i1", prints("x")),
            ("i2", Execution::EnvironmentFailure(anyhow::anyhow!("fork failed"))),
        ]);

        let res = judge(&loader, &sv, &Submission::new("p", "code")).await;

        assert_eq!(res.verdict, Verdict::SystemError);
        assert_eq!(res.details, [outcome("1", CaseStatus::AC)]);
        let path = sv.artifact_path.lock().unwrap().clone().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_testcases_runs_nothing() {
        let loader = OnMemoryProblemLoader::new();
        let sv = FakeSupervisor::default();

        let res = judge(&loader, &sv, &Submission::new("p", "code")).await;

        assert_eq!(res, JudgeResult::without_details(Verdict::TestcasesMissing));
        assert_eq!(res.verdict.to_string(), "Error: TC Missing");
        assert!(sv.executed().is_empty());
        assert!(sv.artifact_path.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn loader_failure_is_system_error() {
        let root = tempfile::tempdir().unwrap();
        fsutil::write_with_mkdir(root.path().join("p/info.json"), r#"{"time_limit": "x"}"#)
            .unwrap();
        fsutil::mkdir_all(root.path().join("p/testcases")).unwrap();
        let sv = FakeSupervisor::default();

        let res = judge(&DirProblemLoader::new(root.path()), &sv, &Submission::new("p", "")).await;
        assert_eq!(res, JudgeResult::without_details(Verdict::SystemError));

        let res = judge(&DirProblemLoader::new(root.path()), &sv, &Submission::new("../p", "")).await;
        assert_eq!(res, JudgeResult::without_details(Verdict::SystemError));
    }

    #[tokio::test]
    async fn unrepresentable_time_limit_is_system_error() {
        let root = tempfile::tempdir().unwrap();
        fsutil::write_with_mkdir(root.path().join("p/info.json"), r#"{"time_limit": 1e20}"#)
            .unwrap();
        fsutil::write_with_mkdir(root.path().join("p/testcases/1.in"), "").unwrap();
        fsutil::write_with_mkdir(root.path().join("p/testcases/1.out"), "").unwrap();
        let sv = FakeSupervisor::default();

        let res = judge(&DirProblemLoader::new(root.path()), &sv, &Submission::new("p", "")).await;
        assert_eq!(res, JudgeResult::without_details(Verdict::SystemError));
        assert!(sv.executed().is_empty());
    }

    // The rest run real python3 processes, like the `sum` problem in the docs.

    fn write_sum_problem(root: &std::path::Path) {
        let dir = root.join("sum");
        fsutil::write_with_mkdir(dir.join("info.json"), r#"{"title": "Sum", "time_limit": 2.0}"#)
            .unwrap();
        fsutil::write_with_mkdir(dir.join("testcases/1.in"), "3 4\n").unwrap();
        fsutil::write_with_mkdir(dir.join("testcases/1.out"), "7").unwrap();
    }

    async fn judge_sum(code: &str) -> JudgeResult {
        let root = tempfile::tempdir().unwrap();
        write_sum_problem(root.path());
        let loader = DirProblemLoader::new(root.path());
        judge(&loader, &ProcessSupervisor::default(), &Submission::new("sum", code)).await
    }

    #[tokio::test]
    async fn sum_accepted() {
        let res = judge_sum("a, b = map(int, input().split())\nprint(a + b)\n").await;
        assert_eq!(res.verdict, Verdict::Accepted);
        assert_eq!(res.details, [outcome("1", CaseStatus::AC)]);
    }

    #[tokio::test]
    async fn sum_wrong_answer() {
        let res = judge_sum("print(8)").await;
        assert_eq!(res.verdict.to_string(), "WA on 1");
        assert_eq!(res.details, [outcome("1", CaseStatus::WA)]);
    }

    #[tokio::test]
    async fn sum_crlf_output_is_accepted() {
        let res = judge_sum(r"import sys; sys.stdout.write('7\r\n')").await;
        assert_eq!(res.verdict, Verdict::Accepted);
    }

    #[tokio::test]
    async fn sum_runtime_error() {
        let res = judge_sum("raise RuntimeError('boom')").await;
        assert_eq!(res.verdict.to_string(), "RE on 1");
        assert_eq!(res.details, [outcome("1", CaseStatus::RE)]);
    }

    #[tokio::test]
    async fn sum_time_limit_exceeded() {
        let res = judge_sum("while True:\n    pass\n").await;
        assert_eq!(res.verdict.to_string(), "TLE");
        assert!(res.details.is_empty());
    }

    #[tokio::test]
    async fn concurrent_submissions_are_independent() {
        let root = tempfile::tempdir().unwrap();
        write_sum_problem(root.path());
        let loader = DirProblemLoader::new(root.path());
        let sv = ProcessSupervisor::default();

        let ok = Submission::new("sum", "a, b = map(int, input().split())\nprint(a + b)\n");
        let wa = Submission::new("sum", "print(8)");
        let (r1, r2) = tokio::join!(judge(&loader, &sv, &ok), judge(&loader, &sv, &wa));
        assert_eq!(r1.verdict, Verdict::Accepted);
        assert_eq!(r2.verdict, Verdict::WrongAnswer("1".into()));
    }
}
