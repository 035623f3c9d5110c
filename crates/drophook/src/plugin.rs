//! Plugin lifecycle: hook the host window some time after enable, unhook and
//! optionally clean up on disable.
//!
//! Window calls can block on the UI thread (`DragAcceptFiles` sends style
//! messages to it), so no lock is held across them. The delayed attempt
//! takes the manager out of the session, hooks, and hands it back; if the
//! session ended meanwhile, the attempt unhooks again itself.

use crate::dispatch::{TokioDispatcher, TrackedDispatcher};
use crate::error::PluginError;
use crate::hook::{ImportContext, WindowHandle, WindowHookManager, WindowSystem};
use ingest::{resolve_target_base, ArchiveImporter, LibraryRefresher, SessionImportTracker, Settings};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long `on_disable` waits for running imports before purging.
pub const IMPORT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Finds the window to hook.
pub trait WindowLocator: Send + Sync + 'static {
    fn locate(&self) -> Option<WindowHandle>;
}

impl<F> WindowLocator for F
where
    F: Fn() -> Option<WindowHandle> + Send + Sync + 'static,
{
    fn locate(&self) -> Option<WindowHandle> {
        self()
    }
}

/// Hook state shared with the delayed install task.
///
/// `manager` is `None` while a hook attempt has it checked out.
struct Session<W: WindowSystem> {
    manager: Option<WindowHookManager<W>>,
    enabled: bool,
}

impl<W: WindowSystem> Session<W> {
    /// End the session and take the manager, if it is not checked out.
    fn close(&mut self) -> Option<WindowHookManager<W>> {
        self.enabled = false;
        self.manager.take()
    }
}

type Imports = TrackedDispatcher<TokioDispatcher>;

/// One plugin instance bound to one host install.
pub struct DropPlugin<W: WindowSystem, L: WindowLocator> {
    app_root: PathBuf,
    handle: Handle,
    runtime: Option<Runtime>,
    session: Arc<Mutex<Session<W>>>,
    tracker: Arc<SessionImportTracker>,
    imports: Arc<Imports>,
    locator: Arc<L>,
    settings: Settings,
    pending: Option<JoinHandle<()>>,
}

impl<W: WindowSystem, L: WindowLocator> DropPlugin<W, L> {
    pub fn new(
        app_root: impl Into<PathBuf>,
        system: W,
        locator: L,
        refresher: Arc<dyn LibraryRefresher>,
    ) -> Result<Self, PluginError> {
        crate::init_tracing();
        let app_root = app_root.into();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("wipdrop-worker")
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();

        let settings = Settings::default();
        let tracker = Arc::new(SessionImportTracker::new());
        let context = ImportContext {
            importer: ArchiveImporter::new(settings.import_options()),
            tracker: tracker.clone(),
            refresher,
        };
        let imports = Arc::new(TrackedDispatcher::new(TokioDispatcher::new(handle.clone())));
        let manager =
            WindowHookManager::new(Arc::new(system), &app_root, context, imports.clone());

        Ok(Self {
            app_root,
            handle,
            runtime: Some(runtime),
            session: Arc::new(Mutex::new(Session {
                manager: Some(manager),
                enabled: false,
            })),
            tracker,
            imports,
            locator: Arc::new(locator),
            settings,
            pending: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tracker(&self) -> &Arc<SessionImportTracker> {
        &self.tracker
    }

    /// `false` while a hook attempt is still in progress.
    pub fn is_hooked(&self) -> bool {
        self.session
            .lock()
            .manager
            .as_ref()
            .is_some_and(|manager| manager.is_active())
    }

    /// Start a session and schedule the hook attempt.
    ///
    /// No-op while an attempt is pending or a hook is active.
    pub fn on_enable(&mut self) -> Result<(), PluginError> {
        let attempt_pending = self.pending.as_ref().is_some_and(|task| !task.is_finished());
        if attempt_pending || self.is_hooked() {
            debug!("enable ignored: hook pending or active");
            return Ok(());
        }

        let settings_path = Settings::path_for_root(&self.app_root);
        self.settings = Settings::load(&settings_path).unwrap_or_else(|err| {
            warn!(error = %err, "using default settings");
            Settings::default()
        });
        self.tracker.clear();
        resolve_target_base(&self.app_root)?;

        {
            let mut session = self.session.lock();
            if let Some(manager) = session.manager.as_mut() {
                manager.set_importer(ArchiveImporter::new(self.settings.import_options()));
            }
            session.enabled = true;
        }

        let delay = Duration::from_millis(self.settings.hook_delay_ms);
        let session = self.session.clone();
        let locator = self.locator.clone();
        info!(delay_ms = self.settings.hook_delay_ms, "scheduling window hook");
        self.pending = Some(self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            attempt_install(&session, locator.as_ref());
        }));
        Ok(())
    }

    /// End the session: unhook, then purge this session's imports if
    /// configured to.
    ///
    /// Imports already handed to the worker are waited for, up to
    /// [`IMPORT_DRAIN_TIMEOUT`], so their directories are purged too.
    pub fn on_disable(&mut self) {
        self.shutdown_hook();

        if self.settings.delete_on_close {
            if !self.imports.wait_idle(IMPORT_DRAIN_TIMEOUT) {
                warn!(
                    running = self.imports.in_flight(),
                    "imports still running, their levels will be kept"
                );
            }
            let removed = self.tracker.purge();
            info!(removed, "purged session imports");
        } else {
            self.tracker.clear();
        }
    }

    fn shutdown_hook(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }

        let manager = self.session.lock().close();
        match manager {
            Some(mut manager) => {
                manager.uninstall();
                self.session.lock().manager = Some(manager);
            }
            None => debug!("hook attempt in progress, it will unhook itself"),
        }
    }
}

impl<W: WindowSystem, L: WindowLocator> Drop for DropPlugin<W, L> {
    fn drop(&mut self) {
        self.shutdown_hook();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn attempt_install<W: WindowSystem, L: WindowLocator>(session: &Mutex<Session<W>>, locator: &L) {
    let mut manager = {
        let mut session = session.lock();
        if !session.enabled {
            debug!("session ended before hook attempt");
            return;
        }
        match session.manager.take() {
            Some(manager) => manager,
            None => {
                debug!("another hook attempt is in progress");
                return;
            }
        }
    };

    match locator.locate() {
        Some(window) => match manager.install(window) {
            Ok(()) => info!(?window, "drop handling enabled"),
            Err(err) => warn!(?window, error = %err, "failed to hook host window"),
        },
        None => warn!("host window not found, drops will not be handled"),
    }

    // Hand back under the same lock that checks the session, so a disable
    // either sees the manager or is seen here.
    {
        let mut guard = session.lock();
        if guard.enabled || !manager.is_active() {
            guard.manager = Some(manager);
            return;
        }
    }

    debug!("session ended during hook attempt, unhooking");
    manager.uninstall();
    session.lock().manager = Some(manager);
}
