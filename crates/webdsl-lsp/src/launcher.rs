//! Editor-side launcher: starts the configured server executable and relays
//! the client's stdio to it.
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command as TokioCommand};

use crate::error::LspError;
use crate::transport::{serialize_notification, write_frame};
use crate::types::{MessageParams, MessageType};

/// A running server process with piped stdio.
#[derive(Debug)]
pub struct ServerProcess {
    command: PathBuf,
    child: Child,
}

impl ServerProcess {
    /// Start `command` with `args` in `workspace_root`.
    pub fn spawn(command: &Path, args: &[String], workspace_root: &Path) -> Result<Self, LspError> {
        let mut cmd = TokioCommand::new(command);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if workspace_root.is_dir() {
            cmd.current_dir(workspace_root);
        }

        let child = cmd
            .spawn()
            .map_err(|e| LspError::SpawnFailed(format!("{}: {}", command.display(), e)))?;
        tracing::info!(command = %command.display(), pid = ?child.id(), "server started");
        Ok(Self {
            command: command.to_path_buf(),
            child,
        })
    }

    /// The executable that was started.
    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Copy `input` into the server and the server's output into `output`
    /// until the server closes its stdout, then return its exit code.
    pub async fn relay<R, W>(mut self, mut input: R, mut output: W) -> Result<i32, LspError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let mut stdin = self
            .child
            .stdin
            .take()
            .ok_or_else(|| LspError::SpawnFailed("could not capture stdin".into()))?;
        let mut stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| LspError::SpawnFailed("could not capture stdout".into()))?;

        let forward = tokio::spawn(async move {
            if let Err(e) = tokio::io::copy(&mut input, &mut stdin).await {
                tracing::debug!("client to server copy ended: {}", e);
            }
            let _ = stdin.shutdown().await;
        });

        let copied = tokio::io::copy(&mut stdout, &mut output).await;
        output.flush().await?;
        forward.abort();
        if let Err(e) = copied {
            tracing::warn!("server to client copy ended: {}", e);
        }

        let status = self.child.wait().await?;
        tracing::info!(command = %self.command.display(), %status, "server exited");
        Ok(status.code().unwrap_or(1))
    }
}

/// Tell the client a launch failed: one `window/showMessage` and one
/// `window/logMessage`, both at error level.
pub async fn report_launch_failure<W>(writer: &mut W, error: &LspError) -> Result<(), LspError>
where
    W: AsyncWrite + Unpin,
{
    let message = format!("webdsl: could not start language server ({})", error);
    for method in ["window/showMessage", "window/logMessage"] {
        let params = serde_json::to_value(MessageParams {
            typ: MessageType::Error,
            message: message.clone(),
        })?;
        write_frame(writer, &serialize_notification(method, params)).await?;
    }
    Ok(())
}
