use std::process::Stdio;
use std::time::Duration;

use tokio::{
    fs::File,
    io::{AsyncRead, AsyncReadExt},
    process::{ChildStderr, ChildStdout, Command},
    task::JoinHandle,
    time::{sleep, timeout},
};

use crate::core::traits::process::{ProcessOutcome, ProcessOutput, ProcessRequest, ProcessRunner};

const CHUNK_SIZE: usize = 8192;
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Runs programs directly on the host with `tokio::process`.
#[derive(Clone, Debug, Default)]
pub struct NativeProcessRunner;

impl NativeProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ProcessRunner for NativeProcessRunner {
    #[tracing::instrument(skip_all, fields(program = %request.program.display()))]
    async fn run(&self, request: &ProcessRequest) -> ProcessOutput {
        // Opened before spawning so a missing input is reported, not fed
        // to the program as an empty stream.
        let input = match &request.stdin {
            Some(path) => match File::open(path).await {
                Ok(file) => Some(file),
                Err(e) => {
                    return ProcessOutput::input_unavailable(format!("{}: {}", path.display(), e));
                }
            },
            None => None,
        };

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so everything the program forks can be killed
        // together with it.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ProcessOutput::launch_failed(format!(
                    "{}: {}",
                    request.program.display(),
                    e
                ));
            }
        };
        let pid = child.id();

        let feeder = match (input, child.stdin.take()) {
            (Some(mut file), Some(mut stdin)) => Some(tokio::spawn(async move {
                // Dropping `stdin` afterwards closes the pipe and signals EOF.
                tokio::io::copy(&mut file, &mut stdin).await
            })),
            _ => None,
        };
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let mut combined = Vec::new();
        let waited = {
            let capture = capture_combined(stdout, stderr, &mut combined);
            tokio::pin!(capture);
            let deadline = sleep(request.budget);
            tokio::pin!(deadline);
            let mut captured = false;

            let waited = loop {
                tokio::select! {
                    status = child.wait() => break Some(status),
                    () = &mut capture, if !captured => captured = true,
                    () = &mut deadline => break None,
                }
            };

            // Leftovers forked by the program would otherwise keep running
            // and hold the output pipes open.
            if let Some(pid) = pid {
                kill_process_group(pid);
            }
            if waited.is_some() && !captured && timeout(DRAIN_GRACE, &mut capture).await.is_err() {
                tracing::debug!("Output pipes still open {:?} after exit", DRAIN_GRACE);
            }
            waited
        };

        let output = match waited {
            Some(Ok(status)) => ProcessOutput {
                output: String::from_utf8_lossy(&combined).into_owned(),
                outcome: ProcessOutcome::Completed {
                    status: status.code(),
                },
            },
            Some(Err(e)) => {
                ProcessOutput::launch_failed(format!("failed to wait for process: {}", e))
            }
            None => {
                tracing::debug!("Budget of {:?} exceeded, killing process", request.budget);
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to kill timed out process: {}", e);
                }
                ProcessOutput::timed_out()
            }
        };

        if let Some(feeder) = feeder {
            finish_feeder(feeder).await;
        }
        output
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(pid) = i32::try_from(pid) else {
        return;
    };
    match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        // Nothing left in the group.
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => tracing::warn!("Failed to kill process group {}: {}", pid, e),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

async fn finish_feeder(feeder: JoinHandle<std::io::Result<u64>>) {
    if !feeder.is_finished() {
        feeder.abort();
        return;
    }
    match feeder.await {
        Ok(Ok(bytes)) => tracing::debug!("Fed {} bytes to stdin", bytes),
        // The program may exit without reading all of its input.
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
        Ok(Err(e)) => tracing::warn!("Failed to feed stdin: {}", e),
        Err(e) => tracing::warn!("Stdin feeder task failed: {}", e),
    }
}

/// Reads stdout and stderr together, appending chunks in arrival order.
async fn capture_combined(
    mut stdout: Option<ChildStdout>,
    mut stderr: Option<ChildStderr>,
    combined: &mut Vec<u8>,
) {
    let mut out_buf = vec![0u8; CHUNK_SIZE];
    let mut err_buf = vec![0u8; CHUNK_SIZE];

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            read = read_chunk(&mut stdout, &mut out_buf) => {
                append_or_close(read, &out_buf, combined, &mut stdout);
            }
            read = read_chunk(&mut stderr, &mut err_buf) => {
                append_or_close(read, &err_buf, combined, &mut stderr);
            }
        }
    }
}

async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buf).await,
        None => std::future::pending().await,
    }
}

fn append_or_close<R>(
    read: std::io::Result<usize>,
    buf: &[u8],
    combined: &mut Vec<u8>,
    reader: &mut Option<R>,
) {
    match read {
        Ok(0) => *reader = None,
        Ok(n) => combined.extend_from_slice(&buf[..n]),
        Err(e) => {
            tracing::warn!("Failed to read process output: {}", e);
            *reader = None;
        }
    }
}
