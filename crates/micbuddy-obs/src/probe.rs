//! Detects whether OBS is running.

use sysinfo::{ProcessRefreshKind, System};

/// Executable names of OBS across platforms, without extension.
pub const OBS_PROCESS_NAMES: [&str; 3] = ["obs64", "obs32", "obs"];

/// Answers "is the host process running right now?".
pub trait HostProbe: Send {
    fn host_running(&mut self) -> bool;
}

/// Whether a process name is one of the OBS executables.
///
/// Matching is case-insensitive and tolerates an `.exe` suffix.
pub fn is_host_process(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    let stem = name.strip_suffix(".exe").unwrap_or(&name);
    OBS_PROCESS_NAMES.contains(&stem)
}

/// [`HostProbe`] backed by the OS process table.
pub struct ProcessProbe {
    system: System,
}

impl ProcessProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for ProcessProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe for ProcessProbe {
    fn host_running(&mut self) -> bool {
        // names only; cpu, memory and disk stats are never read
        self.system
            .refresh_processes_specifics(ProcessRefreshKind::new());
        self.system
            .processes()
            .values()
            .any(|process| is_host_process(process.name()))
    }
}
