use crate::config::DaemonConfig;
use crate::core::policy::Policy;
use crate::core::protocol::{read_message, write_message};
use crate::domain::model::{Request, Response};
use crate::utils::error::{ControlError, Result};
use std::future::Future;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, BufReader};
use tokio::net::UnixListener;
use tokio::task::JoinSet;

/// Requests longer than this are cut off and rejected as malformed.
pub const MAX_REQUEST_BYTES: u64 = 64 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Root-side half of the control center: accepts one JSON request per
/// connection and writes sysfs attributes or runs allow-listed programs.
pub struct Daemon {
    listener: UnixListener,
    socket_path: PathBuf,
    policy: Arc<Policy>,
    request_timeout: Duration,
    shutdown_grace: Duration,
}

impl Daemon {
    /// Binds the socket, replacing a stale file left by a previous run.
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &DaemonConfig) -> Result<Self> {
        Self::bind_with_policy(config, Policy::from_config(config))
    }

    pub fn bind_with_policy(config: &DaemonConfig, policy: Policy) -> Result<Self> {
        let socket_path = PathBuf::from(&config.socket_path);
        match std::fs::remove_file(&socket_path) {
            Ok(()) => tracing::debug!("Removed stale socket {}", socket_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let listener = UnixListener::bind(&socket_path)?;
        // 讓非特權的前端可以連線
        std::fs::set_permissions(
            &socket_path,
            std::fs::Permissions::from_mode(config.socket_mode),
        )?;

        tracing::info!(
            "🔌 Listening on {} (mode {:o})",
            socket_path.display(),
            config.socket_mode
        );

        Ok(Self {
            listener,
            socket_path,
            policy: Arc::new(policy),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        })
    }

    /// How long a connected client may take to send its request line.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// How long shutdown waits for in-flight clients before aborting them.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Serves clients until `shutdown` resolves, then gives in-flight
    /// requests `shutdown_grace` to finish and removes the socket file.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut clients = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping accept loop");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _)) => {
                            let policy = Arc::clone(&self.policy);
                            let timeout = self.request_timeout;
                            clients.spawn(async move {
                                if let Err(e) = handle_client(stream, &policy, timeout).await {
                                    tracing::warn!("client error: {}", e);
                                }
                            });
                        }
                        Err(e) => tracing::warn!("accept failed: {}", e),
                    }
                }
                Some(_) = clients.join_next(), if !clients.is_empty() => {}
            }
        }

        let grace = self.shutdown_grace;
        let drained = tokio::time::timeout(grace, async {
            while clients.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!(
                "Aborting {} client(s) still connected after {:?}",
                clients.len(),
                grace
            );
            clients.shutdown().await;
        }

        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            tracing::warn!(
                "Failed to remove socket {}: {}",
                self.socket_path.display(),
                e
            );
        }
        Ok(())
    }
}

/// Answers a single request. The request line must arrive within
/// `read_timeout` and is capped at [`MAX_REQUEST_BYTES`].
pub async fn handle_client<S>(stream: S, policy: &Policy, read_timeout: Duration) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stream).take(MAX_REQUEST_BYTES);
    let received = tokio::time::timeout(read_timeout, read_message::<_, Request>(&mut reader))
        .await
        .map_err(|_| ControlError::DaemonError {
            message: format!("no request within {:?}", read_timeout),
        })?;

    let response = match received {
        Ok(request) => process_request(request, policy).await,
        Err(ControlError::SerializationError(e)) => {
            tracing::warn!("Rejected malformed request: {}", e);
            Response::failure(format!("parse error: {}", e))
        }
        Err(e) => return Err(e),
    };

    let mut stream = reader.into_inner().into_inner();
    write_message(&mut stream, &response).await
}

pub async fn process_request(request: Request, policy: &Policy) -> Response {
    if let Err(e) = policy.check(&request) {
        tracing::warn!("⛔ {}", e);
        return Response::failure(format!("denied: {}", request.describe()));
    }

    tracing::debug!("Executing {}", request.describe());
    match request {
        Request::Write { path, value } => match tokio::fs::write(&path, value).await {
            Ok(()) => Response::ok(),
            Err(e) => {
                tracing::warn!("Write to {} failed: {}", path, e);
                Response::failure(e.to_string())
            }
        },
        Request::Run { program, args } => {
            match tokio::process::Command::new(&program)
                .args(&args)
                .stdin(std::process::Stdio::null())
                .status()
                .await
            {
                Ok(status) if status.success() => Response::ok(),
                Ok(status) => {
                    tracing::warn!("{} exited with {}", program, status);
                    Response::failure(format!("exit status: {}", status))
                }
                Err(e) => {
                    tracing::warn!("Failed to spawn {}: {}", program, e);
                    Response::failure(e.to_string())
                }
            }
        }
    }
}
