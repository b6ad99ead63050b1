use std::{
    collections::HashMap,
    ffi::OsStr,
    io::{self, Write as _},
    path::Path,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use anyhow::Context as _;
use async_trait::async_trait;
use tempfile::TempPath;
use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    process::{Child, Command},
    time::Instant,
};

use crate::str_interp::interp_args;

/// Submitted source code written to a temporary file.
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct ProgramArtifact {
    path: TempPath,
}

impl ProgramArtifact {
    pub fn materialize(source_code: &str, suffix: &str) -> anyhow::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("ojudge-")
            .suffix(suffix)
            .tempfile()
            .context("Failed to create a temporary program file")?;
        file.write_all(source_code.as_bytes())
            .and_then(|_| file.flush())
            .with_context(|| {
                format!(
                    "Failed to write program to {}",
                    file.path().to_string_lossy()
                )
            })?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl ProcessOutput {
    pub fn exited_normally(&self) -> bool {
        self.status == Some(0)
    }
}

/// What happened to one process run.
#[derive(Debug)]
pub enum Execution {
    Completed(ProcessOutput),
    TimedOut { elapsed: Duration },
    /// Failed to launch or talk to the process. Not caused by the submitted program.
    EnvironmentFailure(anyhow::Error),
}

/// Runs submitted programs. Every process the engine creates goes through this trait.
#[async_trait]
pub trait ExecutionSupervisor: Send + Sync {
    fn materialize(&self, source_code: &str) -> anyhow::Result<ProgramArtifact>;

    async fn execute(
        &self,
        program: &ProgramArtifact,
        input: &str,
        time_limit: Duration,
    ) -> Execution;
}

/// Runs each testcase in a fresh child process started from an argv template.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    command: Vec<String>,
    source_suffix: String,
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_COMMAND
                .iter()
                .map(|&arg| arg.to_owned())
                .collect(),
        )
    }
}

impl ProcessSupervisor {
    pub const DEFAULT_COMMAND: &[&str] = &["python3", "#{filePath}"];
    pub const DEFAULT_SOURCE_SUFFIX: &str = ".py";

    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            source_suffix: Self::DEFAULT_SOURCE_SUFFIX.to_owned(),
        }
    }

    pub fn source_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.source_suffix = suffix.into();
        self
    }

    /// Interpolates the command template with the program file path.
    pub fn command_for(&self, filepath: &Path) -> anyhow::Result<Vec<String>> {
        let vars = Self::make_cmd_interp_vars(filepath);
        let argv = interp_args(&self.command, &vars)
            .with_context(|| format!("Invalid run command {:?}", self.command))?;
        anyhow::ensure!(!argv.is_empty(), "Run command is empty");
        Ok(argv)
    }

    fn make_cmd_interp_vars(filepath: &Path) -> HashMap<&'static str, &OsStr> {
        let mut m: HashMap<_, &OsStr> = HashMap::new();
        m.insert("filePath", filepath.as_os_str());
        m.insert("fileName", filepath.file_name().unwrap_or_default());
        m.insert(
            "fileDir",
            filepath.parent().unwrap_or(Path::new(".")).as_os_str(),
        );
        m.insert("fileStem", filepath.file_stem().unwrap_or_default());
        m.insert("fileExt", filepath.extension().unwrap_or_default());
        m
    }

    /// The child leads a new process group so that its descendants can be killed with it.
    fn spawn(argv: &[String]) -> anyhow::Result<Child> {
        let (program, args) = argv.split_first().context("Run command is empty")?;
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd.spawn().with_context(|| format!("Failed to spawn {:?}", argv))
    }

    /// SIGKILLs every process left in the group led by `pgid`.
    #[cfg(unix)]
    fn kill_process_group(pgid: u32) {
        use nix::{
            errno::Errno,
            sys::signal::{killpg, Signal},
            unistd::Pid,
        };

        match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => log::warn!("Failed to kill process group {}: {}", pgid, e),
        }
    }

    #[cfg(not(unix))]
    fn kill_process_group(_pgid: u32) {}

    async fn communicate(
        proc: &mut Child,
        input: &str,
    ) -> anyhow::Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
        let mut stdin = proc.stdin.take().context("Failed to open stdin")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let feed_stdin = async move {
            let res = stdin.write_all(input.as_bytes()).await;
            drop(stdin); // closing stdin sends EOF to the program
            match res {
                // the program exited or closed stdin without reading all of its input
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                res => res,
            }
        };

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        let (_, _, _, exit_status) = tokio::try_join!(
            feed_stdin,
            stdout.read_to_end(&mut stdout_buf),
            stderr.read_to_end(&mut stderr_buf),
            proc.wait(),
        )
        .context("Failed to communicate with subprocess")?;

        Ok((exit_status, stdout_buf, stderr_buf))
    }
}

#[async_trait]
impl ExecutionSupervisor for ProcessSupervisor {
    fn materialize(&self, source_code: &str) -> anyhow::Result<ProgramArtifact> {
        ProgramArtifact::materialize(source_code, &self.source_suffix)
    }

    async fn execute(
        &self,
        program: &ProgramArtifact,
        input: &str,
        time_limit: Duration,
    ) -> Execution {
        let argv = match self.command_for(program.path()) {
            Ok(argv) => argv,
            Err(e) => return Execution::EnvironmentFailure(e),
        };
        log::debug!("Running: {}", argv.join(" "));

        let start_at = Instant::now();
        let mut proc = match Self::spawn(&argv) {
            Ok(proc) => proc,
            Err(e) => return Execution::EnvironmentFailure(e),
        };
        let pgid = proc.id();

        let res = tokio::time::timeout(time_limit, Self::communicate(&mut proc, input)).await;
        let elapsed = start_at.elapsed();

        // leftover descendants are killed on every outcome
        if let Some(pgid) = pgid {
            Self::kill_process_group(pgid);
        }

        match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
                Execution::TimedOut { elapsed }
            }
            Ok(Err(e)) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill process: {:#}", e));
                Execution::EnvironmentFailure(e)
            }
            Ok(Ok((exit_status, stdout, stderr))) => Execution::Completed(ProcessOutput {
                status: exit_status.code(),
                stdout: String::from_utf8_lossy(&stdout).into(),
                stderr: String::from_utf8_lossy(&stderr).into(),
                elapsed,
            }),
        }
    }
}
