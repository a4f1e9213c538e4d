//! Shell transports for the web terminal
//!
//! Two implementations of [`ShellTransport`] live here:
//!
//! - [`PtyTransport`] -- allocates a real pseudo-terminal and runs an
//!   interactive login shell in it. This is the normal path: the shell
//!   sees a tty, so prompts, colors, and full-screen programs work.
//! - [`PipeTransport`] -- plain piped stdio fallback for hosts where a
//!   pty cannot be allocated. Resize requests are ignored because pipes
//!   have no window size.
//!
//! Output from either transport arrives on a byte channel obtained via
//! [`ShellTransport::take_output`]; the WebSocket handler drains it and
//! relays the bytes to the browser.

use std::io::{Read, Write};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::{mpsc, Mutex};

use crate::error::{DashboardError, Result};

/// Initial pty geometry before the client reports its real size.
pub const DEFAULT_ROWS: u16 = 30;
/// Initial pty width before the client reports its real size.
pub const DEFAULT_COLS: u16 = 120;

/// How long a shell gets to exit after SIGTERM before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Output channel capacity, in read chunks (8 KiB each).
const OUTPUT_BUFFER: usize = 256;

/// Abstraction over a running shell the terminal bridge talks to.
#[async_trait::async_trait]
pub trait ShellTransport: Send + Sync {
    /// Take the receiving end of the shell's output channel.
    ///
    /// Yields `Some` exactly once; later calls return `None`. The channel
    /// closes when the shell exits or its output pipe breaks.
    fn take_output(&mut self) -> Option<mpsc::Receiver<Vec<u8>>>;

    /// Write raw keystrokes to the shell's input.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Terminal`] if the shell's input is closed.
    async fn write_input(&self, data: &[u8]) -> Result<()>;

    /// Resize the shell's window. A no-op for transports without one.
    async fn resize(&self, rows: u16, cols: u16) -> Result<()>;

    /// Check whether the shell has exited, without blocking.
    async fn try_wait(&self) -> Option<u32>;

    /// Terminate the shell: SIGTERM, a short grace period, then kill.
    async fn shutdown(&self);
}

fn login_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string())
}

/// Pty-backed shell session.
pub struct PtyTransport {
    master: Arc<Mutex<Box<dyn MasterPty + Send>>>,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    child: Arc<Mutex<Box<dyn Child + Send + Sync>>>,
    output_rx: Option<mpsc::Receiver<Vec<u8>>>,
}

impl PtyTransport {
    /// Allocate a pty and spawn an interactive login shell in it.
    ///
    /// The shell gets a 256-color terminal environment and starts in the
    /// user's home directory. SSH askpass variables are stripped so that
    /// nothing in the session tries to pop up a GUI prompt.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Terminal`] if the pty cannot be opened or
    /// the shell cannot be spawned.
    pub fn spawn() -> Result<Self> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: DEFAULT_ROWS,
                cols: DEFAULT_COLS,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| DashboardError::Terminal(format!("failed to open pty: {e}")))?;

        let shell = login_shell();
        let mut cmd = CommandBuilder::new(&shell);
        cmd.arg("-il");
        cmd.env("TERM", "xterm-256color");
        cmd.env("COLORTERM", "truecolor");
        cmd.env("LANG", "en_US.UTF-8");
        cmd.env("LC_ALL", "en_US.UTF-8");
        cmd.env_remove("SSH_ASKPASS");
        cmd.env_remove("SSH_ASKPASS_REQUIRE");
        cmd.env_remove("DISPLAY");
        if let Some(dirs) = directories::BaseDirs::new() {
            cmd.cwd(dirs.home_dir());
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| DashboardError::Terminal(format!("failed to spawn `{shell}`: {e}")))?;
        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| DashboardError::Terminal(format!("pty reader unavailable: {e}")))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| DashboardError::Terminal(format!("pty writer unavailable: {e}")))?;

        // Pty reads are blocking, so they get a dedicated OS thread that
        // forwards chunks into an async channel.
        let (output_tx, output_rx) = mpsc::channel::<Vec<u8>>(OUTPUT_BUFFER);
        std::thread::spawn(move || {
            let mut buffer = [0u8; 8192];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if output_tx.blocking_send(buffer[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            master: Arc::new(Mutex::new(pair.master)),
            writer: Arc::new(Mutex::new(writer)),
            child: Arc::new(Mutex::new(child)),
            output_rx: Some(output_rx),
        })
    }
}

#[async_trait::async_trait]
impl ShellTransport for PtyTransport {
    fn take_output(&mut self) -> Option<mpsc::Receiver<Vec<u8>>> {
        self.output_rx.take()
    }

    async fn write_input(&self, data: &[u8]) -> Result<()> {
        let writer = Arc::clone(&self.writer);
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut writer = writer.blocking_lock();
            writer
                .write_all(&data)
                .and_then(|()| writer.flush())
                .map_err(|e| DashboardError::Terminal(format!("pty write failed: {e}")))
        })
        .await
        .map_err(|e| DashboardError::Terminal(format!("pty write task failed: {e}")))??;
        Ok(())
    }

    async fn resize(&self, rows: u16, cols: u16) -> Result<()> {
        let master = Arc::clone(&self.master);
        tokio::task::spawn_blocking(move || {
            let master = master.blocking_lock();
            master
                .resize(PtySize {
                    rows: rows.max(2),
                    cols: cols.max(2),
                    pixel_width: 0,
                    pixel_height: 0,
                })
                .map_err(|e| DashboardError::Terminal(format!("pty resize failed: {e}")))
        })
        .await
        .map_err(|e| DashboardError::Terminal(format!("pty resize task failed: {e}")))??;
        Ok(())
    }

    async fn try_wait(&self) -> Option<u32> {
        let mut child = self.child.lock().await;
        match child.try_wait() {
            Ok(Some(status)) => Some(status.exit_code()),
            Ok(None) => None,
            Err(_) => Some(0),
        }
    }

    async fn shutdown(&self) {
        let child = Arc::clone(&self.child);
        let join = tokio::task::spawn_blocking(move || {
            let mut child = child.blocking_lock();
            if matches!(child.try_wait(), Ok(Some(_))) {
                return;
            }

            #[cfg(unix)]
            if let Some(pid) = child.process_id() {
                // SAFETY: pid was returned for a live child we own.
                unsafe {
                    libc::kill(pid as libc::pid_t, libc::SIGTERM);
                }
            }

            let deadline = std::time::Instant::now() + SHUTDOWN_GRACE;
            while std::time::Instant::now() < deadline {
                if matches!(child.try_wait(), Ok(Some(_))) {
                    return;
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            if let Err(e) = child.kill() {
                tracing::debug!(error = %e, "failed to kill shell after grace period");
            }
        })
        .await;
        if let Err(e) = join {
            tracing::debug!(error = %e, "shell shutdown task failed");
        }
    }
}

/// Piped-stdio fallback shell session.
///
/// Stdout and stderr both feed the output channel. Without a pty most
/// shells drop their prompt and interactive programs misbehave, but basic
/// command execution still works.
pub struct PipeTransport {
    stdin: Arc<Mutex<tokio::process::ChildStdin>>,
    child: Arc<Mutex<tokio::process::Child>>,
    output_rx: Option<mpsc::Receiver<Vec<u8>>>,
}

impl PipeTransport {
    /// Spawn an interactive shell with piped stdio.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Terminal`] if the shell cannot be spawned
    /// or its pipes are unavailable.
    pub fn spawn() -> Result<Self> {
        let shell = login_shell();
        let mut child = Command::new(&shell)
            .arg("-i")
            .env("TERM", "dumb")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DashboardError::Terminal(format!("failed to spawn `{shell}`: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DashboardError::Terminal("shell stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DashboardError::Terminal("shell stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DashboardError::Terminal("shell stderr unavailable".into()))?;

        let (output_tx, output_rx) = mpsc::channel::<Vec<u8>>(OUTPUT_BUFFER);
        tokio::spawn(pump(stdout, output_tx.clone()));
        tokio::spawn(pump(stderr, output_tx));

        Ok(Self {
            stdin: Arc::new(Mutex::new(stdin)),
            child: Arc::new(Mutex::new(child)),
            output_rx: Some(output_rx),
        })
    }
}

async fn pump<R>(mut source: R, tx: mpsc::Sender<Vec<u8>>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;
    let mut buffer = [0u8; 8192];
    loop {
        match source.read(&mut buffer).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buffer[..n].to_vec()).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl ShellTransport for PipeTransport {
    fn take_output(&mut self) -> Option<mpsc::Receiver<Vec<u8>>> {
        self.output_rx.take()
    }

    async fn write_input(&self, data: &[u8]) -> Result<()> {
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(data)
            .await
            .map_err(|e| DashboardError::Terminal(format!("shell write failed: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| DashboardError::Terminal(format!("shell flush failed: {e}")))?;
        Ok(())
    }

    async fn resize(&self, _rows: u16, _cols: u16) -> Result<()> {
        // Pipes have no window size.
        Ok(())
    }

    async fn try_wait(&self) -> Option<u32> {
        let mut child = self.child.lock().await;
        match child.try_wait() {
            Ok(Some(status)) => Some(status.code().unwrap_or(0) as u32),
            Ok(None) => None,
            Err(_) => Some(0),
        }
    }

    async fn shutdown(&self) {
        let mut child = self.child.lock().await;
        if matches!(child.try_wait(), Ok(Some(_))) {
            return;
        }

        #[cfg(unix)]
        if let Some(pid) = child.id() {
            // SAFETY: pid was returned for a live child we own.
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGTERM);
            }
        }

        let grace = tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await;
        if grace.is_err() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "failed to kill shell after grace period");
            }
        }
    }
}
