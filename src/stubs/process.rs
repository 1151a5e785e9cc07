use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::core::traits::process::{ProcessOutput, ProcessRequest, ProcessRunner};

#[derive(Debug)]
struct Response {
    unit: Option<String>,
    input: String,
    output: ProcessOutput,
}

/// Process runner double that answers by stdin file name and, optionally,
/// by the unit a `CompilerStub` artifact was built from.
#[derive(Debug)]
pub struct ProcessRunnerStub {
    default: ProcessOutput,
    responses: Vec<Response>,
    delay: Duration,
    calls: Mutex<Vec<ProcessRequest>>,
}

impl Default for ProcessRunnerStub {
    fn default() -> Self {
        Self::new(ProcessOutput::completed(0, ""))
    }
}

impl ProcessRunnerStub {
    pub fn new(default: ProcessOutput) -> Self {
        Self {
            default,
            responses: Vec::new(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn respond(mut self, input: &str, output: ProcessOutput) -> Self {
        self.responses.push(Response {
            unit: None,
            input: input.to_string(),
            output,
        });
        self
    }

    pub fn respond_for(mut self, unit: &str, input: &str, output: ProcessOutput) -> Self {
        self.responses.push(Response {
            unit: Some(unit.to_string()),
            input: input.to_string(),
            output,
        });
        self
    }

    pub fn calls(&self) -> Vec<ProcessRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ProcessRunner for ProcessRunnerStub {
    async fn run(&self, request: &ProcessRequest) -> ProcessOutput {
        self.calls.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;

        let unit = std::fs::read_to_string(&request.program).ok();
        let input = request.stdin.as_deref().map(Self::file_name);

        self.responses
            .iter()
            .filter(|response| {
                input.as_deref() == Some(response.input.as_str())
                    && (response.unit.is_none() || response.unit == unit)
            })
            .max_by_key(|response| response.unit.is_some())
            .map(|response| response.output.clone())
            .unwrap_or_else(|| self.default.clone())
    }
}
