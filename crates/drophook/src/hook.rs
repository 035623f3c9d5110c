//! Window procedure interception for file drops.
//!
//! [`WindowHookManager`] swaps a window's procedure for an interceptor that
//! picks out `WM_DROPFILES` and forwards every other message to the
//! procedure it replaced. The OS side sits behind [`WindowSystem`] so the
//! state machine runs the same against Win32 and against a test double.
//!
//! At most one hook per window handle: the manager owns the saved original
//! procedure, so a window that is already bound is refused at `install`.

use crate::decode::{decode_drop, DropPayload};
use crate::dispatch::Dispatcher;
use crate::error::{HookError, ERROR_INVALID_WINDOW_HANDLE};
use ingest::{resolve_target_base, ArchiveImporter, ImportPipeline, LibraryRefresher};
use ingest::SessionImportTracker;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Sent to a drop-target window when files are dropped on it.
pub const WM_DROPFILES: u32 = 0x0233;

/// Opaque OS window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Address of a window procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerPtr(pub isize);

impl HandlerPtr {
    pub const NULL: HandlerPtr = HandlerPtr(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// One window message as delivered to a window procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub window: WindowHandle,
    pub id: u32,
    pub wparam: usize,
    pub lparam: isize,
}

/// Receives messages for a hooked window.
pub trait MessageSink: Send + Sync {
    fn on_message(&self, message: &Message) -> isize;
}

/// The OS operations the hook needs.
pub trait WindowSystem: Send + Sync + 'static {
    type Payload: DropPayload;

    /// Keep `sink` alive for `window` and return the procedure address that
    /// routes messages to it.
    ///
    /// Fails with [`HookError::AlreadyActive`] if `window` is already bound,
    /// whichever manager bound it.
    fn bind(&self, window: WindowHandle, sink: Arc<dyn MessageSink>)
        -> Result<HandlerPtr, HookError>;

    /// Release whatever `bind` pinned for `window`.
    fn unbind(&self, window: WindowHandle);

    /// The procedure currently installed on `window`.
    fn current_handler(&self, window: WindowHandle) -> HandlerPtr;

    /// Install `handler` on `window` and return the previous procedure.
    fn swap_handler(&self, window: WindowHandle, handler: HandlerPtr)
        -> Result<HandlerPtr, HookError>;

    /// Register or revoke `window` as a shell drop target.
    fn accept_drops(&self, window: WindowHandle, accept: bool) -> Result<(), HookError>;

    /// Invoke a saved window procedure.
    fn call_handler(&self, handler: HandlerPtr, message: &Message) -> isize;

    /// The platform's default window procedure.
    fn default_handler(&self, message: &Message) -> isize;

    /// Wrap the `wparam` of a `WM_DROPFILES` message.
    fn open_drop(&self, raw: usize) -> Self::Payload;
}

/// What an installed hook feeds dropped files into.
#[derive(Clone)]
pub struct ImportContext {
    pub importer: ArchiveImporter,
    pub tracker: Arc<SessionImportTracker>,
    pub refresher: Arc<dyn LibraryRefresher>,
}

/// The procedure installed on the window while the hook is active.
struct Interceptor<W: WindowSystem> {
    system: Arc<W>,
    original: AtomicIsize,
    pipeline: Arc<ImportPipeline>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl<W: WindowSystem> Interceptor<W> {
    fn original(&self) -> HandlerPtr {
        HandlerPtr(self.original.load(Ordering::Acquire))
    }

    fn set_original(&self, handler: HandlerPtr) {
        self.original.store(handler.0, Ordering::Release);
    }

    /// Decode on the UI thread, import in the background.
    fn handle_drop(&self, raw: usize) {
        let paths = decode_drop(self.system.open_drop(raw));
        if paths.is_empty() {
            info!("drop contained no files");
            return;
        }

        info!(count = paths.len(), "files dropped, importing in background");
        let pipeline = self.pipeline.clone();
        self.dispatcher.dispatch(Box::new(move || {
            pipeline.process_batch(&paths);
        }));
    }

    fn forward(&self, message: &Message) -> isize {
        let original = self.original();
        if original.is_null() {
            debug!(msg = message.id, "no original procedure, using default");
            return self.system.default_handler(message);
        }

        panic::catch_unwind(AssertUnwindSafe(|| {
            self.system.call_handler(original, message)
        }))
        .unwrap_or_else(|_| {
            error!(msg = message.id, "original procedure panicked, using default");
            self.system.default_handler(message)
        })
    }
}

impl<W: WindowSystem> MessageSink for Interceptor<W> {
    fn on_message(&self, message: &Message) -> isize {
        if message.id == WM_DROPFILES {
            self.handle_drop(message.wparam);
            return 0;
        }
        self.forward(message)
    }
}

enum HookState<W: WindowSystem> {
    Idle,
    Active {
        window: WindowHandle,
        interceptor: Arc<Interceptor<W>>,
    },
}

/// Installs and removes the drop interceptor on one window.
pub struct WindowHookManager<W: WindowSystem> {
    system: Arc<W>,
    app_root: PathBuf,
    context: ImportContext,
    dispatcher: Arc<dyn Dispatcher>,
    state: HookState<W>,
}

impl<W: WindowSystem> WindowHookManager<W> {
    pub fn new(
        system: Arc<W>,
        app_root: impl Into<PathBuf>,
        context: ImportContext,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            system,
            app_root: app_root.into(),
            context,
            dispatcher,
            state: HookState::Idle,
        }
    }

    /// Replace the importer used by the next `install`. An active hook keeps
    /// the importer it was installed with.
    pub fn set_importer(&mut self, importer: ArchiveImporter) {
        self.context.importer = importer;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, HookState::Active { .. })
    }

    /// The hooked window, if any.
    pub fn window(&self) -> Option<WindowHandle> {
        match &self.state {
            HookState::Active { window, .. } => Some(*window),
            HookState::Idle => None,
        }
    }

    /// The procedure that was replaced, if a hook is active.
    pub fn original_handler(&self) -> Option<HandlerPtr> {
        match &self.state {
            HookState::Active { interceptor, .. } => Some(interceptor.original()),
            HookState::Idle => None,
        }
    }

    /// Hook `window`.
    ///
    /// The target directory is resolved first; the window is only touched
    /// once that succeeds. If drop registration fails after subclassing,
    /// the original procedure is put back before returning. The manager
    /// becomes active only when both steps succeed.
    pub fn install(&mut self, window: WindowHandle) -> Result<(), HookError> {
        if self.is_active() {
            warn!(?window, "hook already active");
            return Err(HookError::AlreadyActive);
        }
        if window.is_null() {
            return Err(HookError::SubclassFailed(ERROR_INVALID_WINDOW_HANDLE));
        }

        let target_base = resolve_target_base(&self.app_root)?;
        let pipeline = Arc::new(ImportPipeline::new(
            self.context.importer.clone(),
            target_base,
            self.context.tracker.clone(),
            self.context.refresher.clone(),
        ));
        let interceptor = Arc::new(Interceptor {
            system: self.system.clone(),
            original: AtomicIsize::new(0),
            pipeline,
            dispatcher: self.dispatcher.clone(),
        });

        let handler = match self.system.bind(window, interceptor.clone()) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(?window, error = %err, "window already hooked");
                return Err(err);
            }
        };
        // Seed the saved procedure so messages arriving mid-swap still reach
        // the host.
        interceptor.set_original(self.system.current_handler(window));

        let original = match self.system.swap_handler(window, handler) {
            Ok(original) => original,
            Err(err) => {
                self.system.unbind(window);
                warn!(?window, error = %err, "subclassing failed");
                return Err(err);
            }
        };
        interceptor.set_original(original);

        if let Err(err) = self.system.accept_drops(window, true) {
            warn!(?window, error = %err, "drop registration failed, reverting subclass");
            if let Err(restore) = self.system.swap_handler(window, original) {
                error!(?window, error = %restore, "failed to restore original procedure");
            }
            self.system.unbind(window);
            return Err(err);
        }

        info!(?window, original = original.0, "hook installed");
        self.state = HookState::Active {
            window,
            interceptor,
        };
        Ok(())
    }

    /// Handle one message for the hooked window.
    ///
    /// This is what the installed procedure runs. Without an active hook,
    /// the message goes to the default procedure.
    pub fn intercept(&self, message: &Message) -> isize {
        match &self.state {
            HookState::Active { interceptor, .. } => interceptor.on_message(message),
            HookState::Idle => self.system.default_handler(message),
        }
    }

    /// Unhook. Safe to call at any time, any number of times.
    ///
    /// OS failures are logged; the manager always ends up idle.
    pub fn uninstall(&mut self) {
        let HookState::Active {
            window,
            interceptor,
        } = std::mem::replace(&mut self.state, HookState::Idle)
        else {
            debug!("uninstall: no active hook");
            return;
        };

        if let Err(err) = self.system.accept_drops(window, false) {
            warn!(?window, error = %err, "failed to revoke drop target");
        }
        let original = interceptor.original();
        if !original.is_null() {
            if let Err(err) = self.system.swap_handler(window, original) {
                warn!(?window, error = %err, "failed to restore original procedure");
            }
        }
        self.system.unbind(window);
        info!(?window, "hook removed");
    }
}

impl<W: WindowSystem> Drop for WindowHookManager<W> {
    fn drop(&mut self) {
        self.uninstall();
    }
}
