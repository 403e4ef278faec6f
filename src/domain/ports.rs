use crate::domain::model::{CommandOutput, Request, Response};
use crate::utils::error::{ControlError, Result};
use async_trait::async_trait;

/// 需要 root 權限的操作一律經由此通道送往 daemon
#[async_trait]
pub trait PrivilegedChannel: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;

    /// Like [`send`](Self::send), but a `success = false` reply becomes an error.
    async fn send_checked(&self, request: Request) -> Result<()> {
        let response = self.send(request).await?;
        if response.success {
            Ok(())
        } else {
            Err(ControlError::DaemonError {
                message: response
                    .error
                    .unwrap_or_else(|| "unknown daemon error".to_string()),
            })
        }
    }
}

/// Runs helper programs in the user's own session (pactl, rfkill list, wlr-randr).
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn output(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}
