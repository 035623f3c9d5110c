//! Hook lifecycle and message routing against an in-memory window system.

use drophook::{
    DropError, DropPayload, DropPlugin, HandlerPtr, HookError, ImportContext, InlineDispatcher,
    Message, MessageSink, WindowHandle, WindowHookManager, WindowSystem, WM_DROPFILES,
};
use ingest::{ArchiveImporter, LibraryRefresher, SessionImportTracker, Settings};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const WINDOW: WindowHandle = WindowHandle(0x100);
const HOST_PROC: isize = 0x1000;
const INTERCEPTOR_PROC: isize = 0x7777;
const WM_SIZE: u32 = 0x0005;
const HOST_RESULT: isize = 42;
const DEFAULT_RESULT: isize = -1;

#[derive(Default)]
struct FakeState {
    procs: HashMap<isize, isize>,
    sinks: HashMap<isize, Arc<dyn MessageSink>>,
    accepting: HashSet<isize>,
    fail_swap: Option<u32>,
    fail_accept: Option<u32>,
    panic_in_host: bool,
    drops: HashMap<usize, Vec<String>>,
    finished: Vec<usize>,
    forwarded: Vec<(isize, u32)>,
    defaulted: Vec<u32>,
    accept_gate: Option<Gate>,
}

/// Holds the next drop registration until released, the way a cross-thread
/// style change waits for the UI thread.
struct Gate {
    entered: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
}

/// Window system double; clones share state.
#[derive(Clone, Default)]
struct FakeSystem {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSystem {
    fn with_window(window: WindowHandle, proc: isize) -> Self {
        let system = Self::default();
        system.state().procs.insert(window.0, proc);
        system
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn proc_of(&self, window: WindowHandle) -> isize {
        self.state().procs[&window.0]
    }

    /// Deliver a message the way the OS would: through whatever procedure is
    /// currently installed.
    fn send(&self, window: WindowHandle, id: u32, wparam: usize) -> isize {
        let message = Message {
            window,
            id,
            wparam,
            lparam: 0,
        };
        let (proc, sink) = {
            let state = self.state();
            (state.procs[&window.0], state.sinks.get(&window.0).cloned())
        };
        match sink {
            Some(sink) if proc == INTERCEPTOR_PROC => sink.on_message(&message),
            _ => self.call_handler(HandlerPtr(proc), &message),
        }
    }

    fn queue_drop(&self, raw: usize, paths: &[&Path]) {
        let paths = paths.iter().map(|p| p.display().to_string()).collect();
        self.state().drops.insert(raw, paths);
    }
}

impl WindowSystem for FakeSystem {
    type Payload = FakeDrop;

    fn bind(
        &self,
        window: WindowHandle,
        sink: Arc<dyn MessageSink>,
    ) -> Result<HandlerPtr, HookError> {
        let mut state = self.state();
        if state.sinks.contains_key(&window.0) {
            return Err(HookError::AlreadyActive);
        }
        state.sinks.insert(window.0, sink);
        Ok(HandlerPtr(INTERCEPTOR_PROC))
    }

    fn unbind(&self, window: WindowHandle) {
        self.state().sinks.remove(&window.0);
    }

    fn current_handler(&self, window: WindowHandle) -> HandlerPtr {
        HandlerPtr(self.state().procs.get(&window.0).copied().unwrap_or(0))
    }

    fn swap_handler(
        &self,
        window: WindowHandle,
        handler: HandlerPtr,
    ) -> Result<HandlerPtr, HookError> {
        let mut state = self.state();
        if let Some(code) = state.fail_swap {
            return Err(HookError::SubclassFailed(code));
        }
        let previous = state.procs.insert(window.0, handler.0).unwrap_or(0);
        Ok(HandlerPtr(previous))
    }

    fn accept_drops(&self, window: WindowHandle, accept: bool) -> Result<(), HookError> {
        let gate = if accept { self.state().accept_gate.take() } else { None };
        if let Some(gate) = gate {
            gate.entered.send(()).unwrap();
            let _ = gate.release.recv_timeout(Duration::from_secs(10));
        }

        let mut state = self.state();
        if accept {
            if let Some(code) = state.fail_accept {
                return Err(HookError::DropRegistrationFailed(code));
            }
            state.accepting.insert(window.0);
        } else {
            state.accepting.remove(&window.0);
        }
        Ok(())
    }

    fn call_handler(&self, handler: HandlerPtr, message: &Message) -> isize {
        let panic_in_host = {
            let mut state = self.state();
            state.forwarded.push((handler.0, message.id));
            state.panic_in_host
        };
        if panic_in_host {
            panic!("host procedure fault");
        }
        HOST_RESULT
    }

    fn default_handler(&self, message: &Message) -> isize {
        self.state().defaulted.push(message.id);
        DEFAULT_RESULT
    }

    fn open_drop(&self, raw: usize) -> FakeDrop {
        let paths = self.state().drops.get(&raw).cloned().unwrap_or_default();
        FakeDrop {
            raw,
            paths,
            state: self.state.clone(),
        }
    }
}

struct FakeDrop {
    raw: usize,
    paths: Vec<String>,
    state: Arc<Mutex<FakeState>>,
}

impl DropPayload for FakeDrop {
    fn file_count(&self) -> Result<u32, DropError> {
        Ok(self.paths.len() as u32)
    }

    fn path_len(&self, index: u32) -> Result<u32, DropError> {
        Ok(self.paths[index as usize].encode_utf16().count() as u32)
    }

    fn path(&self, index: u32, _len: u32) -> Result<String, DropError> {
        Ok(self.paths[index as usize].clone())
    }

    fn finish(&mut self) {
        self.state.lock().unwrap().finished.push(self.raw);
    }
}

#[derive(Default)]
struct CountingRefresher {
    calls: AtomicUsize,
}

impl LibraryRefresher for CountingRefresher {
    fn refresh(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct Fixture {
    temp: TempDir,
    system: Arc<FakeSystem>,
    tracker: Arc<SessionImportTracker>,
    refresher: Arc<CountingRefresher>,
    manager: WindowHookManager<FakeSystem>,
}

fn setup_with(system: FakeSystem) -> Fixture {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let system = Arc::new(system);
    let tracker = Arc::new(SessionImportTracker::new());
    let refresher = Arc::new(CountingRefresher::default());
    let context = ImportContext {
        importer: ArchiveImporter::default(),
        tracker: tracker.clone(),
        refresher: refresher.clone(),
    };
    let manager = WindowHookManager::new(
        system.clone(),
        temp.path(),
        context,
        Arc::new(InlineDispatcher),
    );
    Fixture {
        temp,
        system,
        tracker,
        refresher,
        manager,
    }
}

fn setup() -> Fixture {
    setup_with(FakeSystem::with_window(WINDOW, HOST_PROC))
}

impl Fixture {
    fn target(&self) -> PathBuf {
        self.temp
            .path()
            .join("Beat Saber_Data")
            .join("CustomWipLevels")
    }

    fn refreshes(&self) -> usize {
        self.refresher.calls.load(Ordering::SeqCst)
    }

    fn archive(&self, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
        let dir = self.temp.path().join("drops");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        create_zip(&path, files);
        path
    }
}

fn create_zip(path: &Path, files: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
}

fn level_files<'a>() -> Vec<(&'a str, &'a [u8])> {
    vec![
        ("Info.dat", b"{}".as_slice()),
        ("song.ogg", b"audio".as_slice()),
        ("HardStandard.dat", b"{}".as_slice()),
    ]
}

fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..500 {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn test_install_then_uninstall_restores_window() {
    let mut fx = setup();

    fx.manager.install(WINDOW).unwrap();

    assert!(fx.manager.is_active());
    assert_eq!(fx.manager.window(), Some(WINDOW));
    assert_eq!(fx.manager.original_handler(), Some(HandlerPtr(HOST_PROC)));
    assert_eq!(fx.system.proc_of(WINDOW), INTERCEPTOR_PROC);
    assert!(fx.system.state().accepting.contains(&WINDOW.0));
    assert!(fx.target().is_dir());

    fx.manager.uninstall();

    assert!(!fx.manager.is_active());
    assert_eq!(fx.manager.window(), None);
    assert_eq!(fx.system.proc_of(WINDOW), HOST_PROC);
    assert!(fx.system.state().accepting.is_empty());
    assert!(fx.system.state().sinks.is_empty());
}

#[test]
fn test_uninstall_is_idempotent() {
    let mut fx = setup();
    fx.manager.uninstall();

    fx.manager.install(WINDOW).unwrap();
    fx.manager.uninstall();
    fx.manager.uninstall();

    assert!(!fx.manager.is_active());
    assert_eq!(fx.system.proc_of(WINDOW), HOST_PROC);
}

#[test]
fn test_second_install_is_rejected() {
    let mut fx = setup();
    fx.manager.install(WINDOW).unwrap();

    let result = fx.manager.install(WindowHandle(0x200));

    assert!(matches!(result, Err(HookError::AlreadyActive)));
    assert_eq!(fx.manager.window(), Some(WINDOW));
    assert_eq!(fx.manager.original_handler(), Some(HandlerPtr(HOST_PROC)));
}

#[test]
fn test_window_hooked_by_another_manager_is_rejected() {
    let mut fx = setup();
    let context = ImportContext {
        importer: ArchiveImporter::default(),
        tracker: Arc::new(SessionImportTracker::new()),
        refresher: Arc::new(CountingRefresher::default()),
    };
    let mut second = WindowHookManager::new(
        fx.system.clone(),
        fx.temp.path(),
        context,
        Arc::new(InlineDispatcher),
    );
    fx.manager.install(WINDOW).unwrap();

    let result = second.install(WINDOW);

    assert!(matches!(result, Err(HookError::AlreadyActive)));
    assert!(!second.is_active());
    assert_eq!(fx.system.proc_of(WINDOW), INTERCEPTOR_PROC);
    assert_eq!(fx.system.send(WINDOW, WM_SIZE, 0), HOST_RESULT);

    // The refused manager must not have disturbed the first hook.
    second.uninstall();
    assert_eq!(fx.manager.original_handler(), Some(HandlerPtr(HOST_PROC)));
    assert_eq!(fx.system.proc_of(WINDOW), INTERCEPTOR_PROC);

    // Once the first hook is gone the window is free again.
    fx.manager.uninstall();
    second.install(WINDOW).unwrap();
    assert_eq!(second.original_handler(), Some(HandlerPtr(HOST_PROC)));
}

#[test]
fn test_null_window_is_rejected() {
    let mut fx = setup();

    let result = fx.manager.install(WindowHandle(0));

    assert!(matches!(result, Err(HookError::SubclassFailed(1400))));
    assert!(!fx.manager.is_active());
}

#[test]
fn test_unresolvable_root_aborts_before_subclassing() {
    let system = Arc::new(FakeSystem::with_window(WINDOW, HOST_PROC));
    let temp = TempDir::new().unwrap();
    let context = ImportContext {
        importer: ArchiveImporter::default(),
        tracker: Arc::new(SessionImportTracker::new()),
        refresher: Arc::new(CountingRefresher::default()),
    };
    let mut manager = WindowHookManager::new(
        system.clone(),
        temp.path().join("missing"),
        context,
        Arc::new(InlineDispatcher),
    );

    let result = manager.install(WINDOW);

    assert!(matches!(result, Err(HookError::Path(_))));
    assert!(!manager.is_active());
    assert_eq!(system.proc_of(WINDOW), HOST_PROC);
    assert!(system.state().sinks.is_empty());
}

#[test]
fn test_subclass_failure_leaves_window_untouched() {
    let system = FakeSystem::with_window(WINDOW, HOST_PROC);
    system.state().fail_swap = Some(5);
    let mut fx = setup_with(system);

    let result = fx.manager.install(WINDOW);

    assert!(matches!(result, Err(HookError::SubclassFailed(5))));
    assert!(!fx.manager.is_active());
    assert_eq!(fx.system.proc_of(WINDOW), HOST_PROC);
    assert!(fx.system.state().sinks.is_empty());
}

#[test]
fn test_drop_registration_failure_reverts_subclass() {
    let system = FakeSystem::with_window(WINDOW, HOST_PROC);
    system.state().fail_accept = Some(1400);
    let mut fx = setup_with(system);

    let result = fx.manager.install(WINDOW);

    assert!(matches!(result, Err(HookError::DropRegistrationFailed(1400))));
    assert!(!fx.manager.is_active());
    assert_eq!(fx.system.proc_of(WINDOW), HOST_PROC);
    assert!(fx.system.state().sinks.is_empty());

    // A later attempt can still succeed.
    fx.system.state().fail_accept = None;
    fx.manager.install(WINDOW).unwrap();
    assert!(fx.manager.is_active());
}

#[test]
fn test_other_messages_reach_the_host() {
    let mut fx = setup();
    fx.manager.install(WINDOW).unwrap();

    let result = fx.system.send(WINDOW, WM_SIZE, 0);

    assert_eq!(result, HOST_RESULT);
    assert_eq!(fx.system.state().forwarded, vec![(HOST_PROC, WM_SIZE)]);
    assert!(fx.system.state().defaulted.is_empty());
}

#[test]
fn test_missing_original_uses_default_handler() {
    let mut fx = setup_with(FakeSystem::with_window(WINDOW, 0));
    fx.manager.install(WINDOW).unwrap();

    let result = fx.system.send(WINDOW, WM_SIZE, 0);

    assert_eq!(result, DEFAULT_RESULT);
    assert!(fx.system.state().forwarded.is_empty());
    assert_eq!(fx.system.state().defaulted, vec![WM_SIZE]);
}

#[test]
fn test_panicking_host_falls_back_to_default() {
    let mut fx = setup();
    fx.manager.install(WINDOW).unwrap();
    fx.system.state().panic_in_host = true;

    let result = fx.system.send(WINDOW, WM_SIZE, 0);

    assert_eq!(result, DEFAULT_RESULT);
    assert_eq!(fx.system.state().defaulted, vec![WM_SIZE]);
    assert!(fx.manager.is_active());
}

#[test]
fn test_idle_manager_uses_default_handler() {
    let fx = setup();
    let message = Message {
        window: WINDOW,
        id: WM_SIZE,
        wparam: 0,
        lparam: 0,
    };

    assert_eq!(fx.manager.intercept(&message), DEFAULT_RESULT);
}

#[test]
fn test_dropped_archive_is_imported() {
    let mut fx = setup();
    fx.manager.install(WINDOW).unwrap();
    let archive = fx.archive("Cool Map.zip", &level_files());
    fx.system.queue_drop(0xD0, &[archive.as_path()]);

    let result = fx.system.send(WINDOW, WM_DROPFILES, 0xD0);

    assert_eq!(result, 0);
    let imported = fx.target().join("Cool Map");
    assert!(imported.join("Info.dat").is_file());
    assert_eq!(fx.tracker.len(), 1);
    assert_eq!(fx.refreshes(), 1);

    let state = fx.system.state();
    assert_eq!(state.finished, vec![0xD0]);
    assert!(state.forwarded.is_empty());
    assert!(state.defaulted.is_empty());
}

#[test]
fn test_mixed_drop_refreshes_once() {
    let mut fx = setup();
    fx.manager.install(WINDOW).unwrap();
    let first = fx.archive("First.zip", &level_files());
    let second = fx.archive("Second.zip", &level_files());
    let broken = fx.archive("Broken.zip", &[("readme.txt", b"nothing here".as_slice())]);
    let notes = fx.temp.path().join("notes.txt");
    fs::write(&notes, "not an archive").unwrap();
    fx.system.queue_drop(
        0xD1,
        &[
            first.as_path(),
            notes.as_path(),
            broken.as_path(),
            second.as_path(),
        ],
    );

    fx.system.send(WINDOW, WM_DROPFILES, 0xD1);

    assert!(fx.target().join("First").is_dir());
    assert!(fx.target().join("Second").is_dir());
    assert!(!fx.target().join("Broken").exists());
    assert_eq!(fx.tracker.len(), 2);
    assert_eq!(fx.refreshes(), 1);
}

#[test]
fn test_empty_drop_does_nothing() {
    let mut fx = setup();
    fx.manager.install(WINDOW).unwrap();
    fx.system.queue_drop(0xD2, &[]);

    assert_eq!(fx.system.send(WINDOW, WM_DROPFILES, 0xD2), 0);

    assert_eq!(fx.refreshes(), 0);
    assert_eq!(fx.system.state().finished, vec![0xD2]);
}

#[test]
fn test_dropping_manager_unhooks() {
    let fx = setup();
    let system = fx.system.clone();
    let Fixture { mut manager, temp, .. } = fx;
    manager.install(WINDOW).unwrap();

    drop(manager);

    assert_eq!(system.proc_of(WINDOW), HOST_PROC);
    assert!(system.state().sinks.is_empty());
    drop(temp);
}

fn write_settings(root: &Path, settings: &Settings) {
    settings.save(&Settings::path_for_root(root)).unwrap();
}

#[test]
fn test_plugin_hooks_after_delay_and_purges_on_disable() {
    let temp = TempDir::new().unwrap();
    write_settings(
        temp.path(),
        &Settings {
            delete_on_close: true,
            hook_delay_ms: 0,
            ..Settings::default()
        },
    );
    let system = FakeSystem::with_window(WINDOW, HOST_PROC);
    let refresher = Arc::new(CountingRefresher::default());
    let mut plugin = DropPlugin::new(
        temp.path(),
        system.clone(),
        || Some(WINDOW),
        refresher.clone(),
    )
    .unwrap();

    plugin.on_enable().unwrap();
    assert!(wait_until(|| plugin.is_hooked()));
    assert!(plugin.settings().delete_on_close);

    let archive = temp.path().join("Session.zip");
    create_zip(&archive, &level_files());
    system.queue_drop(0xE0, &[archive.as_path()]);
    assert_eq!(system.send(WINDOW, WM_DROPFILES, 0xE0), 0);

    let imported = temp
        .path()
        .join("Beat Saber_Data")
        .join("CustomWipLevels")
        .join("Session");
    assert!(wait_until(|| refresher.calls.load(Ordering::SeqCst) == 1));
    assert!(imported.is_dir());
    assert_eq!(plugin.tracker().len(), 1);

    plugin.on_disable();

    assert!(!plugin.is_hooked());
    assert!(!imported.exists());
    assert!(plugin.tracker().is_empty());
    assert_eq!(system.proc_of(WINDOW), HOST_PROC);
}

#[test]
fn test_plugin_keeps_imports_by_default() {
    let temp = TempDir::new().unwrap();
    write_settings(
        temp.path(),
        &Settings {
            hook_delay_ms: 0,
            ..Settings::default()
        },
    );
    let system = FakeSystem::with_window(WINDOW, HOST_PROC);
    let refresher = Arc::new(CountingRefresher::default());
    let mut plugin =
        DropPlugin::new(temp.path(), system.clone(), || Some(WINDOW), refresher.clone()).unwrap();

    plugin.on_enable().unwrap();
    assert!(wait_until(|| plugin.is_hooked()));

    let archive = temp.path().join("Keeper.zip");
    create_zip(&archive, &level_files());
    system.queue_drop(0xE1, &[archive.as_path()]);
    system.send(WINDOW, WM_DROPFILES, 0xE1);
    assert!(wait_until(|| refresher.calls.load(Ordering::SeqCst) == 1));

    plugin.on_disable();

    assert!(temp
        .path()
        .join("Beat Saber_Data")
        .join("CustomWipLevels")
        .join("Keeper")
        .is_dir());
}

#[test]
fn test_plugin_without_window_stays_unhooked() {
    let temp = TempDir::new().unwrap();
    write_settings(
        temp.path(),
        &Settings {
            hook_delay_ms: 0,
            ..Settings::default()
        },
    );
    let located = Arc::new(AtomicUsize::new(0));
    let probe = located.clone();
    let mut plugin = DropPlugin::new(
        temp.path(),
        FakeSystem::with_window(WINDOW, HOST_PROC),
        move || {
            probe.fetch_add(1, Ordering::SeqCst);
            None
        },
        Arc::new(CountingRefresher::default()),
    )
    .unwrap();

    plugin.on_enable().unwrap();

    assert!(wait_until(|| located.load(Ordering::SeqCst) == 1));
    assert!(!plugin.is_hooked());
    plugin.on_disable();
}

#[test]
fn test_plugin_enable_twice_schedules_once() {
    let temp = TempDir::new().unwrap();
    write_settings(
        temp.path(),
        &Settings {
            hook_delay_ms: 60_000,
            ..Settings::default()
        },
    );
    let located = Arc::new(AtomicUsize::new(0));
    let probe = located.clone();
    let mut plugin = DropPlugin::new(
        temp.path(),
        FakeSystem::with_window(WINDOW, HOST_PROC),
        move || {
            probe.fetch_add(1, Ordering::SeqCst);
            Some(WINDOW)
        },
        Arc::new(CountingRefresher::default()),
    )
    .unwrap();

    plugin.on_enable().unwrap();
    plugin.on_enable().unwrap();
    plugin.on_disable();

    assert!(!plugin.is_hooked());
    assert_eq!(located.load(Ordering::SeqCst), 0);
}

#[test]
fn test_plugin_enable_fails_for_missing_root() {
    let temp = TempDir::new().unwrap();
    let mut plugin = DropPlugin::new(
        temp.path().join("not-installed"),
        FakeSystem::default(),
        || Some(WINDOW),
        Arc::new(CountingRefresher::default()),
    )
    .unwrap();

    assert!(plugin.on_enable().is_err());
    assert!(!plugin.is_hooked());
}

#[test]
fn test_plugin_disable_does_not_wait_on_a_hook_in_progress() {
    let temp = TempDir::new().unwrap();
    write_settings(
        temp.path(),
        &Settings {
            hook_delay_ms: 0,
            ..Settings::default()
        },
    );
    let system = FakeSystem::with_window(WINDOW, HOST_PROC);
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    system.state().accept_gate = Some(Gate {
        entered: entered_tx,
        release: release_rx,
    });
    let mut plugin = DropPlugin::new(
        temp.path(),
        system.clone(),
        || Some(WINDOW),
        Arc::new(CountingRefresher::default()),
    )
    .unwrap();

    plugin.on_enable().unwrap();
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let started = Instant::now();
    plugin.on_disable();
    assert!(started.elapsed() < Duration::from_secs(2));

    release_tx.send(()).unwrap();
    assert!(wait_until(|| {
        let state = system.state();
        state.procs[&WINDOW.0] == HOST_PROC && state.sinks.is_empty() && state.accepting.is_empty()
    }));
    assert!(!plugin.is_hooked());
}

#[test]
fn test_plugin_purge_waits_for_running_import() {
    let temp = TempDir::new().unwrap();
    write_settings(
        temp.path(),
        &Settings {
            delete_on_close: true,
            hook_delay_ms: 0,
            ..Settings::default()
        },
    );
    let system = FakeSystem::with_window(WINDOW, HOST_PROC);
    let mut plugin = DropPlugin::new(
        temp.path(),
        system.clone(),
        || Some(WINDOW),
        Arc::new(CountingRefresher::default()),
    )
    .unwrap();
    plugin.on_enable().unwrap();
    assert!(wait_until(|| plugin.is_hooked()));

    let archives: Vec<PathBuf> = (0..5)
        .map(|i| {
            let path = temp.path().join(format!("Late{i}.zip"));
            create_zip(&path, &level_files());
            path
        })
        .collect();
    let refs: Vec<&Path> = archives.iter().map(PathBuf::as_path).collect();
    system.queue_drop(0xE2, &refs);
    system.send(WINDOW, WM_DROPFILES, 0xE2);

    plugin.on_disable();

    let target = temp.path().join("Beat Saber_Data").join("CustomWipLevels");
    assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
    assert!(plugin.tracker().is_empty());
}
