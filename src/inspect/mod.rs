//! Focus and process inspection.
//!
//! Thin adapters over the OS primitives the tracker consumes: which
//! process owns the foreground window, and whether a named process is
//! still running. Liveness goes through the `sysinfo` process table on
//! every platform; the focused-window query is platform specific.

use crate::error::Error;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub use linux::LinuxInspector as NativeInspector;

#[cfg(target_os = "windows")]
pub use windows::WindowsInspector as NativeInspector;

/// The process owning the foreground window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedProcess {
    /// Process name as reported by the OS (not yet lower-cased).
    pub name: String,
    /// Full executable path, or empty when the OS would not say.
    pub path: String,
}

/// Read access to focus and liveness state.
///
/// `focused_process` returns `Ok(None)` for the routine "no foreground
/// window / indeterminate" case and reserves `Err` for real OS-call
/// failures; the driver treats both as "no active app" for that tick.
pub trait Inspector {
    fn focused_process(&mut self) -> Result<Option<FocusedProcess>, Error>;

    /// Takes a fresh snapshot of the process table. The driver calls this
    /// once per tick; every liveness query in that tick answers from the
    /// same snapshot instead of rescanning the table per tracked app.
    fn refresh(&mut self) {}

    /// True iff at least one running process's name case-insensitively
    /// equals `lower_name`, per the last [`Inspector::refresh`] snapshot.
    fn is_process_alive(&mut self, lower_name: &str) -> bool;
}

/// Re-reads the whole process table into the snapshot.
pub(crate) fn refresh_process_table(system: &mut sysinfo::System) {
    system.refresh_processes(sysinfo::ProcessesToUpdate::All, true);
}

/// Liveness lookup against the current snapshot.
pub(crate) fn process_alive(system: &sysinfo::System, lower_name: &str) -> bool {
    system
        .processes()
        .values()
        .any(|process| process.name().to_string_lossy().to_lowercase() == lower_name)
}

/// Stub for platforms without a focus adapter; reports no focus and no
/// live processes so the tracker idles instead of misbehaving.
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub struct NativeInspector;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
impl NativeInspector {
    pub fn new() -> Result<Self, Error> {
        Ok(Self)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
impl Inspector for NativeInspector {
    fn focused_process(&mut self) -> Result<Option<FocusedProcess>, Error> {
        Ok(None)
    }

    fn is_process_alive(&mut self, _lower_name: &str) -> bool {
        false
    }
}
