//! Failover triggers
//!
//! The harness never kills the leader itself. A trigger is the point where
//! the coordinator hands control to whoever does.

use async_trait::async_trait;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::info;

use crate::{HarnessError, Result, TriggerMode};

/// Text shown to the operator on stderr before blocking on stdin
pub const PROMPT: &str = "Kill the leader now and press ENTER";

/// Blocks until the failover has happened
#[async_trait]
pub trait FailoverTrigger: Send + Sync {
    async fn wait(&self) -> Result<()>;
}

/// Prompt the operator and wait for a line on stdin
///
/// The prompt goes to stderr so stdout carries nothing but the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptTrigger;

#[async_trait]
impl FailoverTrigger for PromptTrigger {
    async fn wait(&self) -> Result<()> {
        tokio::task::spawn_blocking(|| {
            prompt_and_wait(PROMPT, &mut io::stdin().lock(), &mut io::stderr())
        })
        .await
        .map_err(|e| HarnessError::Trigger(e.to_string()))??;
        Ok(())
    }
}

/// Write the prompt on its own line, then block until `input` yields a line or EOF
fn prompt_and_wait<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    writeln!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

/// Continue after a fixed delay, for unattended runs
#[derive(Debug, Clone, Copy)]
pub struct TimedTrigger {
    delay: Duration,
}

impl TimedTrigger {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl FailoverTrigger for TimedTrigger {
    async fn wait(&self) -> Result<()> {
        info!("Kill the leader now; continuing in {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

impl TriggerMode {
    /// Build the trigger this mode describes
    pub fn build(&self) -> Box<dyn FailoverTrigger> {
        match *self {
            TriggerMode::Prompt => Box::new(PromptTrigger),
            TriggerMode::After(delay) => Box::new(TimedTrigger::new(delay)),
        }
    }
}
