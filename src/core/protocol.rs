use crate::utils::error::{ControlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Reads a single `\n`-terminated JSON message.
///
/// EOF before any byte is an error; a final line without a trailing newline
/// is still accepted.
pub async fn read_message<R, T>(reader: &mut R) -> Result<T>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
        return Err(ControlError::ParseError {
            what: "message".to_string(),
            message: "connection closed before a message was received".to_string(),
        });
    }
    Ok(serde_json::from_str(line.trim_end())?)
}

pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut payload = serde_json::to_string(message)?;
    payload.push('\n');
    writer.write_all(payload.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Request, Response};
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_read_request_line() {
        let data = b"{\"cmd\":\"write\",\"path\":\"/tmp/x\",\"value\":\"1\"}\n";
        let mut reader = BufReader::new(&data[..]);
        let req: Request = read_message(&mut reader).await.unwrap();
        assert_eq!(req, Request::write("/tmp/x", "1"));
    }

    #[tokio::test]
    async fn test_read_without_trailing_newline() {
        let data = b"{\"success\":false,\"error\":\"nope\"}";
        let mut reader = BufReader::new(&data[..]);
        let resp: Response = read_message(&mut reader).await.unwrap();
        assert_eq!(resp, Response::failure("nope"));
    }

    #[tokio::test]
    async fn test_empty_stream_is_error() {
        let mut reader = BufReader::new(&b""[..]);
        let result: Result<Request> = read_message(&mut reader).await;
        assert!(matches!(result, Err(ControlError::ParseError { .. })));
    }

    #[tokio::test]
    async fn test_write_appends_newline() {
        let mut out = Vec::new();
        write_message(&mut out, &Response::ok()).await.unwrap();
        assert_eq!(out, b"{\"success\":true,\"error\":null}\n");
    }

    #[tokio::test]
    async fn test_request_exchange_on_mock_stream() {
        let mut mock = tokio_test::io::Builder::new()
            .write(b"{\"cmd\":\"run\",\"program\":\"rfkill\",\"args\":[\"toggle\",\"wifi\"]}\n")
            .read(b"{\"success\":true,\"error\":null}\n")
            .build();

        write_message(&mut mock, &Request::run("rfkill", ["toggle", "wifi"]))
            .await
            .unwrap();
        let mut reader = BufReader::new(mock);
        let resp: Response = read_message(&mut reader).await.unwrap();
        assert!(resp.success);
    }
}
