use crate::config::ClientConfig;
use crate::core::protocol::{read_message, write_message};
use crate::domain::model::{Request, Response};
use crate::domain::ports::PrivilegedChannel;
use crate::utils::error::{ControlError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::UnixStream;

#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: String,
    retry_attempts: u32,
    retry_delay: Duration,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            socket_path: config.socket_path.clone(),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: config.retry_delay(),
            timeout: config.timeout(),
        }
    }

    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    async fn connect(&self) -> Result<UnixStream> {
        let mut last_error = String::new();
        for attempt in 1..=self.retry_attempts {
            match UnixStream::connect(&self.socket_path).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::debug!(
                        "connect to {} failed (attempt {}/{}): {}",
                        self.socket_path,
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    last_error = e.to_string();
                    if attempt < self.retry_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(ControlError::ConnectionError {
            path: self.socket_path.clone(),
            attempts: self.retry_attempts,
            message: last_error,
        })
    }

    async fn exchange(&self, stream: UnixStream, request: &Request) -> Result<Response> {
        let mut reader = BufReader::new(stream);
        write_message(reader.get_mut(), request).await?;
        read_message(&mut reader).await
    }
}

#[async_trait]
impl PrivilegedChannel for DaemonClient {
    async fn send(&self, request: Request) -> Result<Response> {
        let stream = self.connect().await?;
        tracing::debug!("→ daemon: {}", request.describe());

        let response = tokio::time::timeout(self.timeout, self.exchange(stream, &request))
            .await
            .map_err(|_| ControlError::ConnectionError {
                path: self.socket_path.clone(),
                attempts: 1,
                message: format!("no response within {:?}", self.timeout),
            })??;

        if !response.success {
            tracing::warn!(
                "Daemon reported failure for {}: {}",
                request.describe(),
                response.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(response)
    }
}
