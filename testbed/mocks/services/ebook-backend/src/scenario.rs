use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// How a mock generation run behaves
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Total time a generation request takes
    pub duration: Duration,
    /// When set, every run fails with this `detail`
    pub failure: Option<String>,
    /// When set, successful runs report the path under this field name
    /// instead of `pdf_path`
    pub path_field: Option<String>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
            failure: None,
            path_field: None,
        }
    }
}

/// Shared server state: the log file stand-in and the produced artifacts.
#[derive(Debug, Default)]
pub struct BackendLog {
    lines: Mutex<Vec<String>>,
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
    runs: Mutex<u64>,
}

impl BackendLog {
    pub fn push(&self, level: &str, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("{level} - {message}"));
        }
    }

    /// The last `count` lines plus the total number of lines written
    pub fn tail(&self, count: usize) -> (Vec<String>, usize) {
        let Ok(lines) = self.lines.lock() else {
            return (vec![], 0);
        };

        let start = lines.len().saturating_sub(count);
        (lines[start..].to_vec(), lines.len())
    }

    pub fn next_run(&self) -> u64 {
        match self.runs.lock() {
            Ok(mut runs) => {
                *runs += 1;
                *runs
            }
            Err(_) => 0,
        }
    }

    pub fn store_artifact(&self, filename: &str, content: Vec<u8>) {
        if let Ok(mut artifacts) = self.artifacts.lock() {
            artifacts.insert(filename.to_string(), content);
        }
    }

    pub fn artifact(&self, filename: &str) -> Option<Vec<u8>> {
        self.artifacts.lock().ok()?.get(filename).cloned()
    }
}

/// File name for a topic, the way the real generator sanitizes it
pub fn artifact_name(topic: &str, run: u64) -> String {
    let safe_topic = topic
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_");

    format!("{safe_topic}_{run:08x}.pdf")
}
