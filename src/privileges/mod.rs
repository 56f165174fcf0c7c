use log::{info, warn};

/// Check if the process is running with elevated privileges
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Get instructions for elevating privileges on the current platform
pub fn get_elevation_instructions() -> &'static str {
    #[cfg(unix)]
    {
        "Run with sudo: 'sudo rust_snapshot'"
    }
    #[cfg(not(unix))]
    {
        "Run with elevated privileges appropriate for your operating system"
    }
}

/// Warn when not running as root; many journals, container configs and
/// `/proc` entries are only readable by root.
pub fn check_privileges() -> bool {
    let elevated = is_elevated();
    if elevated {
        info!("Running as root");
    } else {
        warn!("Running without elevated privileges - some items may be inaccessible");
        warn!("{}", get_elevation_instructions());
    }
    elevated
}
