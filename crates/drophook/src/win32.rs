//! Win32 implementation of the hook's OS seam.

use crate::decode::DropPayload;
use crate::error::{DropError, HookError, ERROR_INVALID_WINDOW_HANDLE};
use crate::hook::{HandlerPtr, Message, MessageSink, WindowHandle, WindowSystem};
use crate::plugin::WindowLocator;
use parking_lot::Mutex;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};
use windows::core::w;
use windows::Win32::Foundation::{
    GetLastError, SetLastError, BOOL, HWND, LPARAM, LRESULT, WIN32_ERROR, WPARAM,
};
use windows::Win32::UI::Shell::{DragAcceptFiles, DragFinish, DragQueryFileW, HDROP};
use windows::Win32::UI::WindowsAndMessaging::{
    CallWindowProcW, DefWindowProcW, FindWindowW, GetWindowLongPtrW, IsWindow,
    SetWindowLongPtrW, GWLP_WNDPROC, WNDPROC,
};

/// Window class of the host's main window.
pub const HOST_WINDOW_CLASS: &str = "UnityWndClass";

/// Title of the host's main window.
pub const HOST_WINDOW_TITLE: &str = "Beat Saber";

/// Query index that makes `DragQueryFileW` return the file count.
const DRAG_QUERY_COUNT: u32 = 0xFFFF_FFFF;

/// Sinks for hooked windows, keyed by raw handle.
static ROUTES: Mutex<Vec<(isize, Arc<dyn MessageSink>)>> = parking_lot::const_mutex(Vec::new());

fn route_for(window: isize) -> Option<Arc<dyn MessageSink>> {
    ROUTES
        .lock()
        .iter()
        .find(|(hwnd, _)| *hwnd == window)
        .map(|(_, sink)| sink.clone())
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

/// The procedure installed on every hooked window.
unsafe extern "system" fn trampoline(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = Message {
        window: WindowHandle(hwnd.0 as isize),
        id: msg,
        wparam: wparam.0,
        lparam: lparam.0,
    };

    // The lock is released before the sink runs; a sink may re-enter.
    let Some(sink) = route_for(message.window.0) else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    match panic::catch_unwind(AssertUnwindSafe(|| sink.on_message(&message))) {
        Ok(result) => LRESULT(result),
        Err(_) => {
            error!(msg, "message handler panicked");
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
    }
}

/// Calls into user32 and shell32.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32System;

impl WindowSystem for Win32System {
    type Payload = Win32Drop;

    fn bind(
        &self,
        window: WindowHandle,
        sink: Arc<dyn MessageSink>,
    ) -> Result<HandlerPtr, HookError> {
        let mut routes = ROUTES.lock();
        if routes.iter().any(|(hwnd, _)| *hwnd == window.0) {
            return Err(HookError::AlreadyActive);
        }
        routes.push((window.0, sink));
        Ok(HandlerPtr(trampoline as usize as isize))
    }

    fn unbind(&self, window: WindowHandle) {
        ROUTES.lock().retain(|(hwnd, _)| *hwnd != window.0);
    }

    fn current_handler(&self, window: WindowHandle) -> HandlerPtr {
        HandlerPtr(unsafe { GetWindowLongPtrW(hwnd(window), GWLP_WNDPROC) })
    }

    fn swap_handler(
        &self,
        window: WindowHandle,
        handler: HandlerPtr,
    ) -> Result<HandlerPtr, HookError> {
        let target = hwnd(window);
        if !unsafe { IsWindow(target) }.as_bool() {
            return Err(HookError::SubclassFailed(ERROR_INVALID_WINDOW_HANDLE));
        }

        // A zero return is only an error if the last-error code says so.
        let previous = unsafe {
            SetLastError(WIN32_ERROR(0));
            SetWindowLongPtrW(target, GWLP_WNDPROC, handler.0)
        };
        if previous == 0 {
            let code = unsafe { GetLastError() };
            if code.0 != 0 {
                return Err(HookError::SubclassFailed(code.0));
            }
        }

        debug!(window = window.0, previous, "window procedure replaced");
        Ok(HandlerPtr(previous))
    }

    fn accept_drops(&self, window: WindowHandle, accept: bool) -> Result<(), HookError> {
        let target = hwnd(window);
        if !unsafe { IsWindow(target) }.as_bool() {
            return Err(HookError::DropRegistrationFailed(ERROR_INVALID_WINDOW_HANDLE));
        }
        unsafe { DragAcceptFiles(target, BOOL::from(accept)) };
        Ok(())
    }

    fn call_handler(&self, handler: HandlerPtr, message: &Message) -> isize {
        // SAFETY: `handler` was read back from GWLP_WNDPROC, so it is a window
        // procedure (or a CallWindowProc handle, which user32 resolves).
        let proc: WNDPROC = unsafe { std::mem::transmute::<isize, WNDPROC>(handler.0) };
        let result = unsafe {
            CallWindowProcW(
                proc,
                hwnd(message.window),
                message.id,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
        };
        result.0
    }

    fn default_handler(&self, message: &Message) -> isize {
        let result = unsafe {
            DefWindowProcW(
                hwnd(message.window),
                message.id,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
        };
        result.0
    }

    fn open_drop(&self, raw: usize) -> Win32Drop {
        Win32Drop {
            handle: HDROP(raw as *mut c_void),
            finished: false,
        }
    }
}

/// An `HDROP` received with `WM_DROPFILES`.
#[derive(Debug)]
pub struct Win32Drop {
    handle: HDROP,
    finished: bool,
}

impl Win32Drop {
    fn last_error() -> u32 {
        unsafe { GetLastError() }.0
    }
}

impl DropPayload for Win32Drop {
    fn file_count(&self) -> Result<u32, DropError> {
        if self.handle.0.is_null() {
            return Err(DropError::Count(ERROR_INVALID_WINDOW_HANDLE));
        }
        Ok(unsafe { DragQueryFileW(self.handle, DRAG_QUERY_COUNT, None) })
    }

    fn path_len(&self, index: u32) -> Result<u32, DropError> {
        Ok(unsafe { DragQueryFileW(self.handle, index, None) })
    }

    fn path(&self, index: u32, len: u32) -> Result<String, DropError> {
        let mut buffer = vec![0u16; len as usize + 1];
        let copied = unsafe { DragQueryFileW(self.handle, index, Some(&mut buffer)) };
        if copied == 0 {
            return Err(DropError::Path {
                index,
                code: Self::last_error(),
            });
        }
        buffer.truncate(copied as usize);
        Ok(String::from_utf16_lossy(&buffer))
    }

    fn finish(&mut self) {
        if self.finished || self.handle.0.is_null() {
            return;
        }
        self.finished = true;
        unsafe { DragFinish(self.handle) };
    }
}

/// Find the host's main window: by class first, then by title.
pub fn find_host_window() -> Option<WindowHandle> {
    let by_class = unsafe { FindWindowW(w!("UnityWndClass"), None) };
    if let Ok(found) = by_class {
        if !found.0.is_null() {
            return Some(WindowHandle(found.0 as isize));
        }
    }

    let by_title = unsafe { FindWindowW(None, w!("Beat Saber")) };
    match by_title {
        Ok(found) if !found.0.is_null() => Some(WindowHandle(found.0 as isize)),
        _ => {
            warn!(
                class = HOST_WINDOW_CLASS,
                title = HOST_WINDOW_TITLE,
                "host window not found"
            );
            None
        }
    }
}

/// Locates the host window with [`find_host_window`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HostWindowLocator;

impl WindowLocator for HostWindowLocator {
    fn locate(&self) -> Option<WindowHandle> {
        find_host_window()
    }
}
