//! Win32 focus inspection.
//!
//! `GetForegroundWindow` gives the active window, its owning PID comes
//! from `GetWindowThreadProcessId`, and `QueryFullProcessImageNameW`
//! resolves the executable path. The process name is the path's final
//! component, matching what the process table reports.

use sysinfo::System;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId};

use super::{process_alive, refresh_process_table, FocusedProcess, Inspector};
use crate::error::Error;

pub struct WindowsInspector {
    system: System,
}

impl WindowsInspector {
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            system: System::new(),
        })
    }

    fn foreground_pid() -> Option<u32> {
        // SAFETY: plain Win32 queries with no pointer arguments beyond the
        // out-parameter for the PID.
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                return None;
            }

            let mut pid: u32 = 0;
            GetWindowThreadProcessId(hwnd, Some(&mut pid));
            (pid != 0).then_some(pid)
        }
    }

    fn executable_path(pid: u32) -> Result<Option<String>, Error> {
        // SAFETY: the handle is opened with the narrowest rights that
        // allow the image-name query and closed before returning.
        unsafe {
            let handle = match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
                Ok(handle) => handle,
                // The process can exit between the PID lookup and here.
                Err(_) => return Ok(None),
            };

            let mut buffer = [0u16; 1024];
            let mut len = buffer.len() as u32;
            let result = QueryFullProcessImageNameW(
                handle,
                PROCESS_NAME_WIN32,
                windows::core::PWSTR(buffer.as_mut_ptr()),
                &mut len,
            );
            let _ = CloseHandle(handle);

            match result {
                Ok(()) => Ok(Some(String::from_utf16_lossy(&buffer[..len as usize]))),
                Err(e) => Err(Error::Inspection(format!(
                    "failed to query image name for pid {pid}: {e}"
                ))),
            }
        }
    }
}

impl Inspector for WindowsInspector {
    fn focused_process(&mut self) -> Result<Option<FocusedProcess>, Error> {
        let Some(pid) = Self::foreground_pid() else {
            return Ok(None);
        };

        let Some(path) = Self::executable_path(pid)? else {
            return Ok(None);
        };

        let name = path
            .rsplit('\\')
            .next()
            .unwrap_or(path.as_str())
            .to_string();

        Ok(Some(FocusedProcess { name, path }))
    }

    fn refresh(&mut self) {
        refresh_process_table(&mut self.system);
    }

    fn is_process_alive(&mut self, lower_name: &str) -> bool {
        process_alive(&self.system, lower_name)
    }
}
