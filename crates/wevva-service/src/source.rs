//! Data sources that produce daily report JSON.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{IngestError, Result};

/// Something that yields one raw JSON report array per call.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Produce the raw report output for one refresh cycle.
    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Runs an external program and reads the report array from its stdout.
#[derive(Debug, Clone)]
pub struct CommandSource {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    api_key_env: String,
}

impl CommandSource {
    /// Create a source that runs `program` with `args`.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, api_key_env: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            name: program.display().to_string(),
            program,
            args,
            api_key_env: api_key_env.into(),
        }
    }

    /// Create a source from the `[source]` config section.
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.args.clone(),
            config.api_key_env.clone(),
        )
    }

    fn failure(&self, reason: impl Into<String>) -> IngestError {
        IngestError::DataSource {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DataSource for CommandSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(key) = std::env::var_os(&self.api_key_env) {
            cmd.env(&self.api_key_env, key);
        }

        debug!("Running data source {}", self.name);
        let output = cmd
            .output()
            .await
            .map_err(|e| self.failure(format!("failed to start: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!("{}, stderr: {}", output.status, stderr.trim())));
        }

        debug!("Data source {} produced {} bytes", self.name, output.stdout.len());
        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandSource {
        CommandSource::new("sh", vec!["-c".to_string(), script.to_string()], "WEATHER_API_KEY")
    }

    #[tokio::test]
    async fn test_fetch_captures_stdout() {
        let source = shell(r#"printf '[{"day":"today","temperatures":[]}]'"#);
        let output = source.fetch().await.unwrap();
        assert_eq!(output, br#"[{"day":"today","temperatures":[]}]"#);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let source = shell("echo 'quota exceeded' >&2; exit 3");
        let err = source.fetch().await.unwrap_err();
        match err {
            IngestError::DataSource { name, reason } => {
                assert_eq!(name, "sh");
                assert!(reason.contains("quota exceeded"), "reason: {reason}");
            }
            other => panic!("expected DataSource, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_failure() {
        let source = CommandSource::new("/nonexistent/wevva-fetch", vec![], "WEATHER_API_KEY");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, IngestError::DataSource { .. }));
        assert!(err.to_string().contains("failed to start"));
    }

    #[test]
    fn test_from_config() {
        let config = SourceConfig {
            program: PathBuf::from("/opt/fetch"),
            args: vec!["--lat".to_string(), "1".to_string()],
            api_key_env: "OWM_KEY".to_string(),
        };
        let source = CommandSource::from_config(&config);
        assert_eq!(source.name(), "/opt/fetch");
        assert_eq!(source.args, config.args);
        assert_eq!(source.api_key_env, "OWM_KEY");
    }
}
