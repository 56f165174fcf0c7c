//! Service log excerpts from the systemd journal.
//!
//! Services are discovered through a [`UnitLister`]; only units whose fragment
//! lives in the distribution's unit directory are collected, which keeps
//! transient and generated units out of the archive.

use std::time::Duration;

use bytes::Bytes;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::collectors::collectible::{Collectible, MemoizedContent};
use crate::constants::{JOURNAL_DAYS, LOGS_DIR, SERVICE_FRAGMENT_PATTERN};
use crate::error::CollectError;
use crate::runner;

lazy_static! {
    static ref SERVICE_FRAGMENT: Regex =
        Regex::new(SERVICE_FRAGMENT_PATTERN).expect("service fragment pattern is valid");
}

/// A loaded unit and the path of the file that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    pub name: String,
    pub fragment_path: String,
}

/// Source of the units known to the init system.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UnitLister: Send + Sync {
    async fn list_units(&self) -> Result<Vec<UnitStatus>, CollectError>;
}

/// Lists units by asking `systemctl`.
pub struct SystemctlUnitLister {
    timeout: Duration,
}

impl SystemctlUnitLister {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn systemctl(&self, args: &[&str]) -> Result<String, CollectError> {
        let mut argv = vec!["systemctl".to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));

        let output = runner::run(&argv, self.timeout)
            .await
            .map_err(|e| CollectError::ProducerUnavailable {
                producer: "systemd",
                reason: e.to_string(),
            })?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

#[async_trait::async_trait]
impl UnitLister for SystemctlUnitLister {
    async fn list_units(&self) -> Result<Vec<UnitStatus>, CollectError> {
        let listing = self
            .systemctl(&["list-units", "--all", "--type=service", "--no-legend", "--no-pager", "--plain"])
            .await?;
        let names = parse_unit_names(&listing);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = vec!["show", "--property=Id", "--property=FragmentPath"];
        args.extend(names.iter().map(String::as_str));
        let properties = self.systemctl(&args).await?;

        Ok(parse_unit_properties(&properties))
    }
}

/// Extract unit names from `systemctl list-units --plain --no-legend` output.
pub fn parse_unit_names(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            line.split_whitespace()
                .find(|token| *token != "●" && *token != "*")
                .map(str::to_string)
        })
        .collect()
}

/// Parse the blank-line separated `Key=Value` blocks of `systemctl show`.
pub fn parse_unit_properties(output: &str) -> Vec<UnitStatus> {
    output
        .split("\n\n")
        .filter_map(|block| {
            let mut name = None;
            let mut fragment_path = String::new();
            for line in block.lines() {
                if let Some(id) = line.strip_prefix("Id=") {
                    name = Some(id.trim().to_string());
                } else if let Some(path) = line.strip_prefix("FragmentPath=") {
                    fragment_path = path.trim().to_string();
                }
            }
            name.filter(|n| !n.is_empty())
                .map(|name| UnitStatus { name, fragment_path })
        })
        .collect()
}

/// Names of the services whose journals should be collected, in listing order.
pub fn collectable_services(units: &[UnitStatus]) -> Vec<String> {
    units
        .iter()
        .filter(|u| SERVICE_FRAGMENT.is_match(&u.fragment_path))
        .map(|u| u.name.clone())
        .collect()
}

/// The last [`JOURNAL_DAYS`] days of one service's journal.
pub struct ServiceLogExcerpt {
    unit: String,
    output: String,
    timeout: Duration,
    content: MemoizedContent,
}

impl ServiceLogExcerpt {
    pub fn new(unit: impl Into<String>, timeout: Duration) -> Self {
        let unit = unit.into();
        Self {
            output: format!("{}{}.log", LOGS_DIR, unit),
            unit,
            timeout,
            content: MemoizedContent::new(),
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn journalctl_args(&self) -> Vec<String> {
        vec![
            "journalctl".to_string(),
            "--since".to_string(),
            format!("-{}d", JOURNAL_DAYS),
            "-l".to_string(),
            "--utc".to_string(),
            "--no-pager".to_string(),
            "-u".to_string(),
            self.unit.clone(),
        ]
    }

    async fn query(&self) -> Result<Vec<u8>, CollectError> {
        info!("Collecting {} days of logs from {:?}", JOURNAL_DAYS, self.unit);
        runner::run(&self.journalctl_args(), self.timeout).await
    }
}

#[async_trait::async_trait]
impl Collectible for ServiceLogExcerpt {
    fn name(&self) -> &str {
        &self.output
    }

    async fn content(&self) -> Result<Bytes, CollectError> {
        self.content.get_or_try_init(self.query()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, fragment_path: &str) -> UnitStatus {
        UnitStatus {
            name: name.to_string(),
            fragment_path: fragment_path.to_string(),
        }
    }

    #[test]
    fn test_journal_name() {
        let jnl = ServiceLogExcerpt::new("testd", Duration::from_secs(1));
        assert_eq!(jnl.name(), "/logs/testd.log");
        assert_eq!(jnl.unit(), "testd");
        assert!(jnl.link().is_none());
    }

    #[test]
    fn test_journalctl_args() {
        let jnl = ServiceLogExcerpt::new("sshd.service", Duration::from_secs(1));
        assert_eq!(
            jnl.journalctl_args(),
            vec!["journalctl", "--since", "-7d", "-l", "--utc", "--no-pager", "-u", "sshd.service"]
        );
    }

    #[test]
    fn test_collectable_services() {
        let units = vec![
            unit("testd.service", "/usr/lib64/systemd/system/testd.service"),
            unit("examd.service", "/usr/lib/systemd/system/examd.service"),
            unit("umount.target", "/usr/lib/systemd/system/umount.target"),
            unit("local.service", "/etc/systemd/system/local.service"),
            unit("transient.service", ""),
        ];

        assert_eq!(collectable_services(&units), vec!["testd.service", "examd.service"]);
    }

    #[test]
    fn test_parse_unit_names() {
        let listing = "\
sshd.service       loaded active   running OpenSSH server daemon
● broken.service   loaded failed   failed  Broken unit
docker.service     loaded inactive dead    Docker Application Container Engine
";
        assert_eq!(
            parse_unit_names(listing),
            vec!["sshd.service", "broken.service", "docker.service"]
        );
        assert!(parse_unit_names("").is_empty());
    }

    #[test]
    fn test_parse_unit_properties() {
        let output = "\
Id=sshd.service
FragmentPath=/usr/lib/systemd/system/sshd.service

Id=run-user.service
FragmentPath=

FragmentPath=/orphan
";
        let units = parse_unit_properties(output);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0], unit("sshd.service", "/usr/lib/systemd/system/sshd.service"));
        assert_eq!(units[1], unit("run-user.service", ""));
    }

    #[tokio::test]
    async fn test_mock_lister_feeds_service_filter() {
        let mut lister = MockUnitLister::new();
        lister.expect_list_units().times(1).returning(|| {
            Ok(vec![
                unit("testd.service", "/usr/lib64/systemd/system/testd.service"),
                unit("notaservice", "/usr/lib/systemd/system/umount.target"),
            ])
        });

        let units = lister.list_units().await.unwrap();
        assert_eq!(collectable_services(&units), vec!["testd.service"]);
    }
}
