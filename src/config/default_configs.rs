use crate::config::snapshot_config::{CommandSpec, FileSpec, SnapshotConfig};

fn file(name: &str, link: Option<&str>) -> FileSpec {
    FileSpec {
        name: name.into(),
        link: link.map(Into::into),
    }
}

fn command(args: &[&str], link: Option<&str>) -> CommandSpec {
    CommandSpec {
        args: args.iter().map(|a| a.to_string()).collect(),
        link: link.map(Into::into),
    }
}

impl SnapshotConfig {
    /// Default configuration for a Linux host
    pub fn default_host() -> Self {
        SnapshotConfig {
            files: vec![
                file("/proc/vmstat", None),
                file("/proc/meminfo", Some("meminfo")),
                file("/etc/os-release", Some("os-release")),
                file("/proc/mounts", Some("mounts")),
            ],
            commands: vec![
                command(&["hostname"], Some("hostname")),
                command(&["date"], Some("date")),
                command(&["systemd-cgls"], None),
                command(&["systemd-cgtop", "-n1"], None),
                command(&["ps", "fauxwww"], Some("ps")),
                command(&["lsmod"], Some("lsmod")),
                command(&["lspci"], Some("lspci")),
                command(&["lsof", "-b", "-M", "-n", "-l"], Some("lsof")),
                command(&["blkid"], None),
                command(&["btrfs", "fi", "show"], None),
                command(&["df", "-al"], Some("df")),
                command(&["ip", "-o", "addr", "show"], Some("ip_addr_show")),
                command(&["ip", "-o", "link", "show"], Some("ip_link_show")),
                command(&["ip", "-o", "route", "show"], Some("ip_route_show")),
                command(&["netstat", "-neopa"], Some("netstat")),
                command(&["df", "-ali"], None),
                command(&["free", "-m"], Some("free")),
                command(&["systemctl", "list-units", "-a"], Some("all_units")),
                command(&["systemctl", "list-units", "--state=running"], Some("running_units")),
                command(&["systemctl", "status", "etcd.service"], Some("etcd_status")),
                command(&["systemctl", "status", "etcd2.service"], Some("etcd2_status")),
                command(&["systemctl", "status", "fleet.service"], Some("fleet_status")),
                command(&["systemctl", "status", "flanneld.service"], Some("flanneld_status")),
            ],
        }
    }
}
