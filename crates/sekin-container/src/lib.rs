//! Capability surface over a running container: the supervisor never talks
//! to a container runtime API directly, it goes through this trait so that
//! a real client-library-backed implementation can be swapped in without
//! touching callers.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use sekin_config::SupervisorError;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Pending,
    Running,
    Stopped,
    Failed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Term,
    Kill,
}

impl Signal {
    fn as_str(self) -> &'static str {
        match self {
            Signal::Term => "SIGTERM",
            Signal::Kill => "SIGKILL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait ContainerDriver: Send + Sync {
    async fn inspect_state(&self, container: &str) -> Result<ContainerState, SupervisorError>;
    async fn signal(&self, container: &str, sig: Signal) -> Result<(), SupervisorError>;
    async fn exec(&self, container: &str, cmd: &[String]) -> Result<ExecOutput, SupervisorError>;
    async fn copy_in(&self, container: &str, dest: &Path, tar: Bytes) -> Result<(), SupervisorError>;
    async fn copy_out(&self, container: &str, src: &Path) -> Result<Bytes, SupervisorError>;
    async fn compose_up(&self, manifest_path: &Path, services: &[String]) -> Result<(), SupervisorError>;

    /// Polls `inspect_state` until it reports `target` or `attempts` is
    /// exhausted, sleeping `interval` between tries.
    async fn wait_for_state(
        &self,
        container: &str,
        target: ContainerState,
        attempts: u32,
        interval: std::time::Duration,
    ) -> Result<bool, SupervisorError> {
        for attempt in 0..attempts {
            if self.inspect_state(container).await? == target {
                return Ok(true);
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(interval).await;
            }
        }
        Ok(false)
    }

    /// Mirrors the three-attempts/one-second-apart health check every
    /// manifest edit in this codebase is gated on.
    async fn wait_running(
        &self,
        container: &str,
        attempts: u32,
        interval: std::time::Duration,
    ) -> Result<bool, SupervisorError> {
        self.wait_for_state(container, ContainerState::Running, attempts, interval).await
    }
}

/// Production driver: shells out to the `docker` / `docker compose` CLI.
/// The actual container-runtime API is an out-of-scope capability surface;
/// this is the thin process-spawning edge of it.
#[derive(Debug, Clone, Default)]
pub struct ProcessComposeDriver;

#[async_trait]
impl ContainerDriver for ProcessComposeDriver {
    #[instrument(skip(self))]
    async fn inspect_state(&self, container: &str) -> Result<ContainerState, SupervisorError> {
        let output = Command::new("docker")
            .args(["inspect", "--format", "{{.State.Status}}", container])
            .output()
            .await
            .map_err(|e| SupervisorError::ContainerOp(e.to_string()))?;
        if !output.status.success() {
            return Ok(ContainerState::Unknown);
        }
        let status = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(match status.as_str() {
            "running" => ContainerState::Running,
            "created" => ContainerState::Pending,
            "exited" | "dead" => ContainerState::Stopped,
            "restarting" | "paused" => ContainerState::Pending,
            _ => ContainerState::Unknown,
        })
    }

    #[instrument(skip(self))]
    async fn signal(&self, container: &str, sig: Signal) -> Result<(), SupervisorError> {
        let status = Command::new("docker")
            .args(["kill", "--signal", sig.as_str(), container])
            .status()
            .await
            .map_err(|e| SupervisorError::ContainerOp(e.to_string()))?;
        if !status.success() {
            return Err(SupervisorError::ContainerOp(format!(
                "docker kill {container} ({:?}) failed",
                sig
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, cmd))]
    async fn exec(&self, container: &str, cmd: &[String]) -> Result<ExecOutput, SupervisorError> {
        let output = Command::new("docker")
            .arg("exec")
            .arg(container)
            .args(cmd)
            .output()
            .await
            .map_err(|e| SupervisorError::ContainerOp(e.to_string()))?;
        debug!(exit_code = output.status.code(), "exec finished");
        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn copy_in(&self, container: &str, dest: &Path, tar: Bytes) -> Result<(), SupervisorError> {
        use tokio::io::AsyncWriteExt;
        let mut child = Command::new("docker")
            .args(["cp", "-", &format!("{container}:{}", dest.display())])
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| SupervisorError::ContainerOp(e.to_string()))?;
        let mut stdin = child.stdin.take().expect("stdin was piped");
        stdin
            .write_all(&tar)
            .await
            .map_err(|e| SupervisorError::ContainerOp(e.to_string()))?;
        drop(stdin);
        let status = child.wait().await.map_err(|e| SupervisorError::ContainerOp(e.to_string()))?;
        if !status.success() {
            return Err(SupervisorError::ContainerOp(format!("docker cp into {container} failed")));
        }
        Ok(())
    }

    async fn copy_out(&self, container: &str, src: &Path) -> Result<Bytes, SupervisorError> {
        let output = Command::new("docker")
            .args(["cp", &format!("{container}:{}", src.display()), "-"])
            .output()
            .await
            .map_err(|e| SupervisorError::ContainerOp(e.to_string()))?;
        if !output.status.success() {
            return Err(SupervisorError::ContainerOp(format!("docker cp from {container} failed")));
        }
        Ok(Bytes::from(output.stdout))
    }

    #[instrument(skip(self))]
    async fn compose_up(&self, manifest_path: &Path, services: &[String]) -> Result<(), SupervisorError> {
        let mut args = vec![
            "compose".to_string(),
            "-f".to_string(),
            manifest_path.display().to_string(),
            "up".to_string(),
            "-d".to_string(),
            "--no-deps".to_string(),
            "--remove-orphans".to_string(),
        ];
        args.extend(services.iter().cloned());
        let status = Command::new("docker")
            .args(&args)
            .status()
            .await
            .map_err(|e| SupervisorError::ContainerOp(e.to_string()))?;
        if !status.success() {
            return Err(SupervisorError::ContainerOp("docker compose up failed".to_string()));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every call made against it and returns scripted states,
    /// so the executor's unit tests don't need a real Docker daemon.
    #[derive(Default)]
    pub struct FakeContainerDriver {
        pub states: Mutex<HashMap<String, ContainerState>>,
        pub calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContainerDriver for FakeContainerDriver {
        async fn inspect_state(&self, container: &str) -> Result<ContainerState, SupervisorError> {
            self.calls.lock().unwrap().push(format!("inspect_state({container})"));
            Ok(*self.states.lock().unwrap().get(container).unwrap_or(&ContainerState::Unknown))
        }

        async fn signal(&self, container: &str, sig: Signal) -> Result<(), SupervisorError> {
            self.calls.lock().unwrap().push(format!("signal({container}, {:?})", sig));
            self.states.lock().unwrap().insert(container.to_string(), ContainerState::Stopped);
            Ok(())
        }

        async fn exec(&self, container: &str, cmd: &[String]) -> Result<ExecOutput, SupervisorError> {
            self.calls.lock().unwrap().push(format!("exec({container}, {cmd:?})"));
            Ok(ExecOutput {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }

        async fn copy_in(&self, container: &str, dest: &Path, _tar: Bytes) -> Result<(), SupervisorError> {
            self.calls.lock().unwrap().push(format!("copy_in({container}, {})", dest.display()));
            Ok(())
        }

        async fn copy_out(&self, container: &str, src: &Path) -> Result<Bytes, SupervisorError> {
            self.calls.lock().unwrap().push(format!("copy_out({container}, {})", src.display()));
            Ok(Bytes::new())
        }

        async fn compose_up(&self, _manifest_path: &Path, services: &[String]) -> Result<(), SupervisorError> {
            self.calls.lock().unwrap().push(format!("compose_up({services:?})"));
            for state in self.states.lock().unwrap().values_mut() {
                *state = ContainerState::Running;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeContainerDriver;
    use super::*;

    #[tokio::test]
    async fn wait_running_succeeds_once_state_flips() {
        let driver = FakeContainerDriver::default();
        driver.states.lock().unwrap().insert("sekai".to_string(), ContainerState::Stopped);
        driver.compose_up(Path::new("compose.yml"), &[]).await.unwrap();
        let ok = driver
            .wait_running("sekai", 3, std::time::Duration::from_millis(1))
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn wait_running_times_out_when_never_running() {
        let driver = FakeContainerDriver::default();
        driver.states.lock().unwrap().insert("sekai".to_string(), ContainerState::Stopped);
        let ok = driver
            .wait_running("sekai", 2, std::time::Duration::from_millis(1))
            .await
            .unwrap();
        assert!(!ok);
    }
}
