//! # Drophook
//!
//! Hooks the host's main window so that archives dropped onto it from the
//! file manager are imported as levels.
//!
//! The window procedure is replaced with an interceptor that handles
//! `WM_DROPFILES` and forwards everything else untouched. Dropped paths are
//! decoded on the UI thread and imported on a background worker; the library
//! is refreshed once per drop that produced at least one level.
//!
//! [`WindowHookManager`] runs against any [`WindowSystem`]; the Win32 one
//! lives in [`win32`] and is only built on Windows.

pub mod decode;
pub mod dispatch;
pub mod error;
pub mod hook;
pub mod plugin;
#[cfg(windows)]
pub mod win32;

use tracing_subscriber::EnvFilter;

pub use decode::{decode_drop, DropPayload};
pub use dispatch::{Dispatcher, InlineDispatcher, Job, TokioDispatcher, TrackedDispatcher};
pub use error::{DropError, HookError, PluginError};
pub use hook::{
    HandlerPtr, ImportContext, Message, MessageSink, WindowHandle, WindowHookManager,
    WindowSystem, WM_DROPFILES,
};
pub use plugin::{DropPlugin, WindowLocator};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Does nothing if the host process already installed a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
