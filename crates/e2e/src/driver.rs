//! Persistent Playwright driver process
//!
//! A small Node.js script is staged in a temp dir and run under `node`. It
//! reads one JSON command per line on stdin and answers each with one JSON
//! line on stdout, so a single browser page survives across the fill, wait
//! and read steps of a case. Every command carries a sequence id that the
//! reply echoes; replies to abandoned commands are discarded.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{E2eError, E2eResult};

/// Node side of the protocol
pub const DRIVER_SCRIPT: &str = r#"
const readline = require('readline');
const { chromium, firefox, webkit } = require('playwright');

const engines = { chromium, firefox, webkit };
let browser = null;
let page = null;

function reply(body, done) {
  process.stdout.write(JSON.stringify(body) + '\n', done);
}

async function handle(msg) {
  switch (msg.cmd) {
    case 'launch': {
      browser = await engines[msg.browser].launch({ headless: msg.headless });
      const context = await browser.newContext({
        viewport: { width: msg.width, height: msg.height },
      });
      page = await context.newPage();
      return {};
    }
    case 'goto':
      await page.goto(msg.url, { timeout: msg.timeout_ms });
      await page.waitForLoadState('networkidle', { timeout: msg.timeout_ms });
      return {};
    case 'fill':
      await page.locator(msg.selector).first().fill(msg.value);
      return {};
    case 'wait':
      await page.waitForTimeout(msg.ms);
      return {};
    case 'controls': {
      const values = await page.locator(msg.selector).evaluateAll(
        (els) => els.map((e) => (typeof e.value === 'string' ? e.value : '')));
      return { values };
    }
    case 'regions': {
      const values = await page.locator(msg.selector).evaluateAll((els, src) => {
        const re = new RegExp(src, 'u');
        return els.map((e) => e.textContent || '').filter((t) => re.test(t));
      }, msg.pattern);
      return { values };
    }
    case 'click_text': {
      const button = page.locator('button', { hasText: msg.text }).first();
      if ((await button.count()) === 0 || !(await button.isVisible())) {
        return { clicked: false };
      }
      await button.click({ timeout: msg.timeout_ms });
      return { clicked: true };
    }
    case 'input_value': {
      const value = await page.locator(msg.selector).first().inputValue();
      return { value };
    }
    case 'close':
      if (browser) await browser.close();
      browser = null;
      return {};
    default:
      throw new Error('unknown command: ' + msg.cmd);
  }
}

const rl = readline.createInterface({ input: process.stdin, terminal: false });
let queue = Promise.resolve();
rl.on('line', (line) => {
  queue = queue.then(async () => {
    let msg;
    try {
      msg = JSON.parse(line);
    } catch (e) {
      reply({ ok: false, error: 'bad command: ' + e.message });
      return;
    }
    let body;
    try {
      body = Object.assign({ ok: true, id: msg.id }, await handle(msg));
    } catch (e) {
      body = { ok: false, id: msg.id, error: e.message };
    }
    reply(body, msg.cmd === 'close' ? () => process.exit(0) : undefined);
  });
});
rl.on('close', async () => {
  if (browser) await browser.close();
  process.exit(0);
});
"#;

/// Commands understood by [`DRIVER_SCRIPT`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DriverCommand {
    Launch {
        browser: String,
        headless: bool,
        width: u32,
        height: u32,
    },
    Goto {
        url: String,
        timeout_ms: u64,
    },
    Fill {
        selector: String,
        value: String,
    },
    Wait {
        ms: u64,
    },
    Controls {
        selector: String,
    },
    Regions {
        selector: String,
        pattern: String,
    },
    ClickText {
        text: String,
        timeout_ms: u64,
    },
    InputValue {
        selector: String,
    },
    Close,
}

impl DriverCommand {
    fn name(&self) -> &'static str {
        match self {
            DriverCommand::Launch { .. } => "launch",
            DriverCommand::Goto { .. } => "goto",
            DriverCommand::Fill { .. } => "fill",
            DriverCommand::Wait { .. } => "wait",
            DriverCommand::Controls { .. } => "controls",
            DriverCommand::Regions { .. } => "regions",
            DriverCommand::ClickText { .. } => "click_text",
            DriverCommand::InputValue { .. } => "input_value",
            DriverCommand::Close => "close",
        }
    }
}

/// One reply line
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DriverReply {
    pub ok: bool,
    /// Sequence id of the command this answers
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub clicked: Option<bool>,
}

impl DriverReply {
    pub fn parse(line: &str) -> E2eResult<Self> {
        serde_json::from_str(line.trim())
            .map_err(|e| E2eError::Protocol(format!("unparseable reply {:?}: {}", line, e)))
    }

    fn into_result(self, command: &str) -> E2eResult<Self> {
        if self.ok {
            Ok(self)
        } else {
            Err(E2eError::Driver(format!(
                "{} failed: {}",
                command,
                self.error.as_deref().unwrap_or("unknown error")
            )))
        }
    }
}

struct DriverIo {
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

impl DriverIo {
    /// Frame `command` with a fresh sequence id
    fn frame(&mut self, command: &DriverCommand) -> E2eResult<(u64, String)> {
        self.next_id += 1;
        let mut value = serde_json::to_value(command)?;
        match value.as_object_mut() {
            Some(fields) => {
                fields.insert("id".into(), self.next_id.into());
            }
            None => {
                return Err(E2eError::Protocol(format!(
                    "{} did not encode as an object",
                    command.name()
                )))
            }
        }
        let mut line = serde_json::to_string(&value)?;
        line.push('\n');
        Ok((self.next_id, line))
    }

    async fn exchange(&mut self, id: u64, line: &str, name: &str) -> E2eResult<DriverReply> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        loop {
            let Some(raw) = self.lines.next_line().await? else {
                return Err(E2eError::Protocol(format!(
                    "driver exited before answering {}",
                    name
                )));
            };
            let reply = DriverReply::parse(&raw)?;
            if reply.id == Some(id) {
                return Ok(reply);
            }
            debug!("Discarding stale driver reply {:?} while waiting for {} #{}", reply.id, name, id);
        }
    }
}

/// A running `node` driver
pub struct DriverProcess {
    child: Child,
    io: Mutex<DriverIo>,
    /// Keeps the staged script alive for the life of the process
    _script_dir: TempDir,
}

impl DriverProcess {
    /// Stage the driver script and start `node` on it
    pub async fn spawn(node_modules: Option<&Path>) -> E2eResult<Self> {
        Self::spawn_with("node", node_modules).await
    }

    /// Same as [`DriverProcess::spawn`] with an explicit interpreter
    pub async fn spawn_with(
        program: impl AsRef<OsStr>,
        node_modules: Option<&Path>,
    ) -> E2eResult<Self> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("transcheck-driver.js");
        tokio::fs::write(&script_path, DRIVER_SCRIPT).await?;

        debug!("Starting Playwright driver: {}", script_path.display());

        let mut cmd = Command::new(program);
        cmd.arg(&script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(path) = node_path(node_modules) {
            cmd.env("NODE_PATH", path);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| E2eError::DriverStartup(format!("failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::DriverStartup("driver stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::DriverStartup("driver stdout unavailable".into()))?;

        Ok(Self {
            child,
            io: Mutex::new(DriverIo {
                stdin,
                lines: BufReader::new(stdout).lines(),
                next_id: 0,
            }),
            _script_dir: script_dir,
        })
    }

    /// Send one command and wait for its reply.
    ///
    /// A command that times out may still be answered later; that reply is
    /// skipped by id when the next command reads its own.
    pub async fn request(&self, command: DriverCommand, limit: Duration) -> E2eResult<DriverReply> {
        let name = command.name();

        let mut io = self.io.lock().await;
        let (id, line) = io.frame(&command)?;
        let reply = tokio::time::timeout(limit, io.exchange(id, &line, name))
            .await
            .map_err(|_| E2eError::Timeout(format!("driver command {}", name)))??;
        reply.into_result(name)
    }

    /// Ask the driver to close the browser and wait for it to exit
    pub async fn shutdown(mut self, limit: Duration) -> E2eResult<()> {
        if let Err(e) = self.request(DriverCommand::Close, limit).await {
            warn!("Driver close failed: {}", e);
        }
        match tokio::time::timeout(limit, self.child.wait()).await {
            Ok(status) => {
                debug!("Driver exited: {}", status?);
                Ok(())
            }
            Err(_) => {
                self.terminate();
                Err(E2eError::Timeout("driver shutdown".into()))
            }
        }
    }

    fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(id) = self.child.id() {
                let _ = kill(Pid::from_raw(id as i32), Signal::SIGTERM);
            }
        }

        let _ = self.child.start_kill();
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            self.terminate();
        }
    }
}

/// NODE_PATH for `require('playwright')`: the explicit directory, else a
/// `node_modules` in the working directory
fn node_path(node_modules: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = node_modules {
        return Some(path.to_path_buf());
    }
    let local = std::env::current_dir().ok()?.join("node_modules");
    local.is_dir().then_some(local)
}
