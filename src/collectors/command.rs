use std::time::Duration;

use bytes::Bytes;
use log::info;

use crate::collectors::collectible::{Collectible, MemoizedContent};
use crate::constants::{COMMANDS_DIR, DEFAULT_COMMAND_TIMEOUT_SECS};
use crate::error::CollectError;
use crate::runner;

/// The standard output of one external command.
pub struct ShellCommand {
    args: Vec<String>,
    link: Option<String>,
    output: String,
    timeout: Duration,
    content: MemoizedContent,
}

impl ShellCommand {
    /// A command archived under the commands namespace, e.g. `["free", "-m"]`
    /// becomes `/commands/free_-m`.
    pub fn new(args: Vec<String>, link: Option<String>) -> Self {
        let output = format!("{}{}", COMMANDS_DIR, args.join("_"));
        Self {
            args,
            link: link.filter(|l| !l.is_empty()),
            output,
            timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            content: MemoizedContent::new(),
        }
    }

    /// Archive the output under an explicit name instead of the derived one.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    async fn execute(&self) -> Result<Vec<u8>, CollectError> {
        info!("Running command: {:?}", self.args.join(" "));
        runner::run(&self.args, self.timeout).await
    }
}

#[async_trait::async_trait]
impl Collectible for ShellCommand {
    fn name(&self) -> &str {
        &self.output
    }

    fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    async fn content(&self) -> Result<Bytes, CollectError> {
        self.content.get_or_try_init(self.execute()).await
    }
}
