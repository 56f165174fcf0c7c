//! Runtime discovery of collectibles.
//!
//! Each producer is queried exactly once. A producer that fails is recorded
//! and contributes nothing; the other categories are unaffected.

use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};

use crate::collectors::collectible::Collectible;
use crate::collectors::container::{container_logs, ContainerMetadata, ContainerSource, DockerConfigDir};
use crate::collectors::failure_tracker::FailureTracker;
use crate::collectors::journal::{collectable_services, ServiceLogExcerpt, SystemctlUnitLister, UnitLister};
use crate::collectors::pod::{pod_logs, PodMetadata, PodRuntime, RktPodRuntime};
use crate::security::redactor::Redactor;

/// The discovery producers of a run. A `None` producer is not queried.
#[derive(Default)]
pub struct Producers {
    pub units: Option<Box<dyn UnitLister>>,
    pub containers: Option<Box<dyn ContainerSource>>,
    pub pods: Option<Box<dyn PodRuntime>>,
}

impl Producers {
    /// No discovery at all; only configured files and commands are collected.
    pub fn none() -> Self {
        Self::default()
    }

    /// The producers that talk to the local host.
    pub fn host(timeout: Duration, docker_root: Option<PathBuf>) -> Self {
        Self {
            units: Some(Box::new(SystemctlUnitLister::new(timeout))),
            containers: Some(Box::new(
                docker_root.map(DockerConfigDir::new).unwrap_or_default(),
            )),
            pods: Some(Box::new(RktPodRuntime::new())),
        }
    }

    pub fn with_units(mut self, units: Option<Box<dyn UnitLister>>) -> Self {
        self.units = units;
        self
    }

    pub fn with_containers(mut self, containers: Option<Box<dyn ContainerSource>>) -> Self {
        self.containers = containers;
        self
    }

    pub fn with_pods(mut self, pods: Option<Box<dyn PodRuntime>>) -> Self {
        self.pods = pods;
        self
    }
}

/// How discovered items are built.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryOptions {
    pub redactor: Redactor,
    /// Deadline for every command a discovered item runs.
    pub timeout: Duration,
}

/// Query every producer and build the discovered collectibles, in the order
/// journals, containers, pods.
pub async fn discover(
    producers: &Producers,
    options: &DiscoveryOptions,
    tracker: &mut FailureTracker,
) -> Vec<Box<dyn Collectible>> {
    let mut items: Vec<Box<dyn Collectible>> = Vec::new();

    if let Some(units) = &producers.units {
        match units.list_units().await {
            Ok(units) => {
                let services = collectable_services(&units);
                info!("Found {} services with journals", services.len());
                items.extend(services.into_iter().map(|unit| {
                    Box::new(ServiceLogExcerpt::new(unit, options.timeout)) as Box<dyn Collectible>
                }));
            }
            Err(e) => {
                warn!("Skipping service logs: {}", e);
                tracker.record("service logs", &e);
            }
        }
    }

    if let Some(containers) = &producers.containers {
        match containers.list_containers().await {
            Ok(containers) => {
                info!("Found {} containers", containers.len());
                let ids: Vec<String> = containers.iter().map(|c| c.id.clone()).collect();
                items.extend(containers.into_iter().map(|container| {
                    Box::new(ContainerMetadata::new(container, options.redactor)) as Box<dyn Collectible>
                }));
                if options.redactor.is_danger() {
                    items.extend(ids.iter().map(|id| {
                        Box::new(container_logs(id, options.timeout)) as Box<dyn Collectible>
                    }));
                }
            }
            Err(e) => {
                warn!("Skipping container metadata: {}", e);
                tracker.record("containers", &e);
            }
        }
    }

    if let Some(pods) = &producers.pods {
        match pods.list_pods().await {
            Ok(pods) => {
                info!("Found {} pods", pods.len());
                let running: Vec<String> = pods
                    .iter()
                    .filter(|p| p.is_running())
                    .map(|p| p.id.clone())
                    .collect();
                items.extend(
                    pods.into_iter()
                        .map(|pod| Box::new(PodMetadata::new(pod)) as Box<dyn Collectible>),
                );
                if options.redactor.is_danger() {
                    items.extend(running.iter().map(|id| {
                        Box::new(pod_logs(id, options.timeout)) as Box<dyn Collectible>
                    }));
                }
            }
            Err(e) => {
                warn!("Skipping pod metadata: {}", e);
                tracker.record("pods", &e);
            }
        }
    }

    items
}
