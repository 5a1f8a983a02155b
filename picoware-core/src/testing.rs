//! Test doubles for the hardware capabilities
//!
//! Every double is a cheap handle over shared state, so a test can keep one
//! clone for inspection while another clone is boxed into a [`Platform`].
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream crates.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use picoware_hal::storage::{self, DirEntry};
use picoware_hal::{
    Button, Color, DisplayError, DrawSurface, InputManager, Network, Storage, StorageError, System, Vector, WifiDriver,
    WifiError, WifiEvent, WifiStatus,
};

use crate::config::Settings;
use crate::context::{Context, Platform};
use crate::error::AppError;
use crate::view::App;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    FillRect { at: Vector, size: Vector, color: Color },
    Text { at: Vector, text: String, color: Color },
}

#[derive(Debug, Default)]
struct DisplayLog {
    ops: Vec<DrawOp>,
    pixels: usize,
    swaps: usize,
    failing: bool,
}

/// Draw surface that records calls instead of drawing
#[derive(Debug, Clone)]
pub struct MockDisplay {
    size: Vector,
    log: Rc<RefCell<DisplayLog>>,
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDisplay {
    /// A 320x320 surface, the PicoCalc panel size
    pub fn new() -> Self {
        Self::with_size(Vector::new(320, 320))
    }

    pub fn with_size(size: Vector) -> Self {
        Self {
            size,
            log: Rc::new(RefCell::new(DisplayLog::default())),
        }
    }

    /// Make every subsequent call fail with `Communication`
    pub fn set_failing(&self, failing: bool) {
        self.log.borrow_mut().failing = failing;
    }

    pub fn ops(&self) -> Vec<DrawOp> {
        self.log.borrow().ops.clone()
    }

    /// Every string drawn, in order
    pub fn texts(&self) -> Vec<String> {
        self.log
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Check if any drawn string contains `needle`
    pub fn contains_text(&self, needle: &str) -> bool {
        self.log.borrow().ops.iter().any(|op| match op {
            DrawOp::Text { text, .. } => text.contains(needle),
            _ => false,
        })
    }

    /// Number of rectangle fills in `color`
    pub fn fills_with(&self, color: Color) -> usize {
        self.log
            .borrow()
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { color: c, .. } if *c == color))
            .count()
    }

    pub fn fills(&self) -> usize {
        self.log
            .borrow()
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { .. }))
            .count()
    }

    pub fn pixels(&self) -> usize {
        self.log.borrow().pixels
    }

    /// Frames presented since creation (not reset by `clear_log`)
    pub fn swaps(&self) -> usize {
        self.log.borrow().swaps
    }

    /// Forget recorded drawing calls
    pub fn clear_log(&self) {
        let mut log = self.log.borrow_mut();
        log.ops.clear();
        log.pixels = 0;
    }

    fn record(&self, op: Option<DrawOp>) -> Result<(), DisplayError> {
        let mut log = self.log.borrow_mut();
        if log.failing {
            return Err(DisplayError::Communication);
        }
        match op {
            Some(op) => log.ops.push(op),
            None => log.pixels += 1,
        }
        Ok(())
    }
}

impl DrawSurface for MockDisplay {
    fn size(&self) -> Vector {
        self.size
    }

    fn pixel(&mut self, _at: Vector, _color: Color) -> Result<(), DisplayError> {
        self.record(None)
    }

    fn fill_rect(&mut self, at: Vector, size: Vector, color: Color) -> Result<(), DisplayError> {
        self.record(Some(DrawOp::FillRect { at, size, color }))
    }

    fn text(&mut self, at: Vector, text: &str, color: Color) -> Result<(), DisplayError> {
        self.record(Some(DrawOp::Text {
            at,
            text: String::from(text),
            color,
        }))
    }

    fn swap(&mut self) -> Result<(), DisplayError> {
        let mut log = self.log.borrow_mut();
        if log.failing {
            return Err(DisplayError::Communication);
        }
        log.swaps += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct InputState {
    queue: VecDeque<Button>,
    resets: usize,
}

/// Input latch fed from a queue of scripted presses
///
/// The front of the queue is the latched button; `reset` consumes it.
#[derive(Debug, Clone, Default)]
pub struct MockInput {
    state: Rc<RefCell<InputState>>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, button: Button) {
        self.state.borrow_mut().queue.push_back(button);
    }

    /// Queue every character of `text` as a key press
    pub fn type_text(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.queue.extend(text.chars().map(Button::Char));
    }

    /// Presses not yet consumed
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn resets(&self) -> usize {
        self.state.borrow().resets
    }
}

impl InputManager for MockInput {
    fn button(&self) -> Option<Button> {
        self.state.borrow().queue.front().copied()
    }

    fn reset(&mut self) {
        let mut state = self.state.borrow_mut();
        state.queue.pop_front();
        state.resets += 1;
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MemoryFs {
    mounted: bool,
    failure: Option<StorageError>,
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

impl MemoryFs {
    fn is_dir(&self, path: &str) -> bool {
        path.is_empty() || self.dirs.contains(path)
    }

    fn create_dirs(&mut self, path: &str) {
        let mut dir = path;
        while !dir.is_empty() {
            self.dirs.insert(String::from(dir));
            dir = storage::parent(dir);
        }
    }
}

/// In-memory file store
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    fs: Rc<RefCell<MemoryFs>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// An empty, mounted store
    pub fn new() -> Self {
        Self {
            fs: Rc::new(RefCell::new(MemoryFs {
                mounted: true,
                failure: None,
                files: BTreeMap::new(),
                dirs: BTreeSet::new(),
            })),
        }
    }

    /// A store with no medium present
    pub fn unmounted() -> Self {
        let store = Self::new();
        store.set_mounted(false);
        store
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.fs.borrow_mut().mounted = mounted;
    }

    /// Make every operation on a mounted store fail with `failure`
    pub fn set_failure(&self, failure: Option<StorageError>) {
        self.fs.borrow_mut().failure = failure;
    }

    /// Delete a file regardless of mount state
    pub fn forget(&self, path: &str) {
        self.fs.borrow_mut().files.remove(storage::normalize(path));
    }

    /// Place a file (and its directories) regardless of mount state
    pub fn insert(&self, path: &str, data: &[u8]) {
        let path = storage::normalize(path);
        let mut fs = self.fs.borrow_mut();
        fs.create_dirs(storage::parent(path));
        fs.files.insert(String::from(path), data.to_vec());
    }

    /// Contents of a file regardless of mount state
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.fs.borrow().files.get(storage::normalize(path)).cloned()
    }

    fn mounted(&self) -> Result<(), StorageError> {
        let fs = self.fs.borrow();
        if !fs.mounted {
            return Err(StorageError::NotMounted);
        }
        fs.failure.map_or(Ok(()), Err)
    }
}

impl Storage for MemoryStorage {
    fn is_mounted(&self) -> bool {
        self.fs.borrow().mounted
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.mounted()?;
        let path = storage::normalize(path);
        let fs = self.fs.borrow();
        if fs.is_dir(path) {
            return Err(StorageError::WrongKind);
        }
        fs.files.get(path).cloned().ok_or(StorageError::NotFound)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        self.mounted()?;
        let path = storage::normalize(path);
        if path.is_empty() {
            return Err(StorageError::InvalidPath);
        }
        let mut fs = self.fs.borrow_mut();
        if fs.is_dir(path) {
            return Err(StorageError::WrongKind);
        }
        fs.create_dirs(storage::parent(path));
        fs.files.insert(String::from(path), data.to_vec());
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> Result<(), StorageError> {
        self.mounted()?;
        let path = storage::normalize(path);
        let mut fs = self.fs.borrow_mut();
        if fs.files.contains_key(path) {
            return Err(StorageError::WrongKind);
        }
        fs.create_dirs(path);
        Ok(())
    }

    fn exists(&mut self, path: &str) -> bool {
        if self.mounted().is_err() {
            return false;
        }
        let path = storage::normalize(path);
        let fs = self.fs.borrow();
        fs.is_dir(path) || fs.files.contains_key(path)
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        self.mounted()?;
        let path = storage::normalize(path);
        let mut fs = self.fs.borrow_mut();
        if fs.files.remove(path).is_some() {
            return Ok(());
        }
        if path.is_empty() || !fs.dirs.contains(path) {
            return Err(StorageError::NotFound);
        }
        let has_children = fs.files.keys().chain(fs.dirs.iter()).any(|p| storage::parent(p) == path);
        if has_children {
            return Err(StorageError::Io);
        }
        fs.dirs.remove(path);
        Ok(())
    }

    fn list(&mut self, dir: &str) -> Result<Vec<DirEntry>, StorageError> {
        self.mounted()?;
        let dir = storage::normalize(dir);
        let fs = self.fs.borrow();
        if !fs.is_dir(dir) {
            return Err(if fs.files.contains_key(dir) {
                StorageError::WrongKind
            } else {
                StorageError::NotFound
            });
        }

        let dirs = fs.dirs.iter().filter(|p| storage::parent(p) == dir).map(|p| DirEntry {
            name: String::from(storage::file_name(p)),
            is_dir: true,
            size: 0,
        });
        let files = fs.files.iter().filter(|(p, _)| storage::parent(p) == dir).map(|(p, data)| DirEntry {
            name: String::from(storage::file_name(p)),
            is_dir: false,
            size: data.len() as u32,
        });

        let mut entries: Vec<DirEntry> = dirs.chain(files).collect();
        storage::sort_entries(&mut entries);
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// WiFi
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Scan,
    Connect(String),
}

#[derive(Debug)]
struct WifiState {
    status: WifiStatus,
    networks: Vec<Network>,
    connect_result: Result<(), WifiError>,
    pending: Option<Pending>,
    events: VecDeque<WifiEvent>,
    connected: Option<String>,
    scans: usize,
    connects: Vec<(String, String)>,
    cancels: usize,
}

/// Scripted radio
///
/// Requests stay pending until the test calls [`MockWifi::complete_pending`].
#[derive(Debug, Clone)]
pub struct MockWifi {
    state: Rc<RefCell<WifiState>>,
}

impl Default for MockWifi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWifi {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(WifiState {
                status: WifiStatus::Disconnected,
                networks: Vec::new(),
                connect_result: Ok(()),
                pending: None,
                events: VecDeque::new(),
                connected: None,
                scans: 0,
                connects: Vec::new(),
                cancels: 0,
            })),
        }
    }

    /// Networks reported by the next scans
    pub fn set_networks(&self, networks: &[(&str, i16, bool)]) {
        self.state.borrow_mut().networks = networks
            .iter()
            .map(|(ssid, rssi, secured)| Network {
                ssid: String::from(*ssid),
                rssi: *rssi,
                secured: *secured,
            })
            .collect();
    }

    /// Outcome of the next connection attempts
    pub fn set_connect_result(&self, result: Result<(), WifiError>) {
        self.state.borrow_mut().connect_result = result;
    }

    /// Finish the outstanding request and queue its event
    pub fn complete_pending(&self) {
        let mut state = self.state.borrow_mut();
        match state.pending.take() {
            Some(Pending::Scan) => {
                let networks = state.networks.clone();
                state.events.push_back(WifiEvent::ScanComplete(networks));
                state.status = idle_status(&state.connected);
            }
            Some(Pending::Connect(ssid)) => match state.connect_result {
                Ok(()) => {
                    state.connected = Some(ssid);
                    state.status = WifiStatus::Connected;
                    state.events.push_back(WifiEvent::Connected);
                }
                Err(e) => {
                    state.connected = None;
                    state.status = WifiStatus::Disconnected;
                    state.events.push_back(WifiEvent::ConnectFailed(e));
                }
            },
            None => {}
        }
    }

    pub fn has_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    pub fn scans(&self) -> usize {
        self.state.borrow().scans
    }

    /// `(ssid, password)` of every connection attempt
    pub fn connects(&self) -> Vec<(String, String)> {
        self.state.borrow().connects.clone()
    }

    pub fn cancels(&self) -> usize {
        self.state.borrow().cancels
    }
}

fn idle_status(connected: &Option<String>) -> WifiStatus {
    if connected.is_some() {
        WifiStatus::Connected
    } else {
        WifiStatus::Disconnected
    }
}

impl WifiDriver for MockWifi {
    fn status(&self) -> WifiStatus {
        self.state.borrow().status
    }

    fn scan(&mut self) -> Result<(), WifiError> {
        let mut state = self.state.borrow_mut();
        if state.pending.is_some() {
            return Err(WifiError::Busy);
        }
        state.pending = Some(Pending::Scan);
        state.status = WifiStatus::Scanning;
        state.scans += 1;
        Ok(())
    }

    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), WifiError> {
        let mut state = self.state.borrow_mut();
        if state.pending.is_some() {
            return Err(WifiError::Busy);
        }
        state.pending = Some(Pending::Connect(String::from(ssid)));
        state.status = WifiStatus::Connecting;
        state.connects.push((String::from(ssid), String::from(password)));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), WifiError> {
        let mut state = self.state.borrow_mut();
        state.pending = None;
        if state.connected.take().is_some() {
            state.events.push_back(WifiEvent::Disconnected);
        }
        state.status = WifiStatus::Disconnected;
        Ok(())
    }

    fn cancel(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.pending.take().is_some() {
            state.cancels += 1;
        }
        state.status = idle_status(&state.connected);
    }

    fn take_event(&mut self) -> Option<WifiEvent> {
        self.state.borrow_mut().events.pop_front()
    }

    fn connected_ssid(&self) -> Option<String> {
        self.state.borrow().connected.clone()
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SystemState {
    millis: u64,
    seed: u32,
    free_heap: usize,
    reclaims: usize,
}

/// Manually advanced clock with a deterministic RNG
#[derive(Debug, Clone)]
pub struct MockSystem {
    state: Rc<RefCell<SystemState>>,
}

impl Default for MockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSystem {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SystemState {
                millis: 0,
                seed: 0x2545_F491,
                free_heap: 128 * 1024,
                reclaims: 0,
            })),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.state.borrow_mut().millis += ms;
    }

    pub fn set_free_heap(&self, bytes: usize) {
        self.state.borrow_mut().free_heap = bytes;
    }

    pub fn reclaims(&self) -> usize {
        self.state.borrow().reclaims
    }
}

impl System for MockSystem {
    fn millis(&self) -> u64 {
        self.state.borrow().millis
    }

    fn random(&mut self) -> u32 {
        let mut state = self.state.borrow_mut();
        let mut x = state.seed;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state.seed = x;
        x
    }

    fn free_heap(&self) -> usize {
        self.state.borrow().free_heap
    }

    fn reclaim(&mut self) {
        self.state.borrow_mut().reclaims += 1;
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// A full set of doubles plus handles to inspect them
#[derive(Debug, Clone, Default)]
pub struct TestPlatform {
    pub display: MockDisplay,
    pub input: MockInput,
    pub storage: MemoryStorage,
    pub wifi: Option<MockWifi>,
    pub system: MockSystem,
}

impl TestPlatform {
    /// Every capability present, storage mounted and empty
    pub fn new() -> Self {
        Self {
            wifi: Some(MockWifi::new()),
            ..Self::default()
        }
    }

    /// A board without a radio
    pub fn without_wifi() -> Self {
        Self::default()
    }

    /// The radio double; panics on a board built without one
    pub fn wifi(&self) -> &MockWifi {
        self.wifi.as_ref().expect("platform has no wifi")
    }

    /// Box clones of the doubles into a [`Platform`]
    pub fn platform(&self) -> Platform {
        Platform {
            display: Box::new(self.display.clone()),
            input: Box::new(self.input.clone()),
            storage: Box::new(self.storage.clone()),
            wifi: self
                .wifi
                .clone()
                .map(|w| Box::new(w) as Box<dyn WifiDriver>),
            system: Box::new(self.system.clone()),
        }
    }

    /// A context over this platform with default settings
    pub fn context(&self) -> Context {
        Context::new(self.platform(), Settings::default())
    }
}

// ---------------------------------------------------------------------------
// Probe app
// ---------------------------------------------------------------------------

type RunHook = Box<dyn FnMut(&mut Context)>;

struct ProbeState {
    start_result: Result<bool, AppError>,
    run_fails: bool,
    fail_run_on: Option<usize>,
    stop_fails: bool,
    starts: usize,
    runs: usize,
    stops: usize,
    on_run: Option<RunHook>,
}

/// Scriptable app that counts its callbacks
#[derive(Clone)]
pub struct Probe {
    state: Rc<RefCell<ProbeState>>,
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ProbeState {
                start_result: Ok(true),
                run_fails: false,
                fail_run_on: None,
                stop_fails: false,
                starts: 0,
                runs: 0,
                stops: 0,
                on_run: None,
            })),
        }
    }

    /// An app driven by this probe
    pub fn app(&self) -> ProbeApp {
        ProbeApp {
            state: self.state.clone(),
        }
    }

    pub fn set_start_result(&self, result: Result<bool, AppError>) {
        self.state.borrow_mut().start_result = result;
    }

    pub fn set_run_fails(&self, fails: bool) {
        self.state.borrow_mut().run_fails = fails;
    }

    /// Fail only the `n`th run (1-based)
    pub fn fail_run_on(&self, n: usize) {
        self.state.borrow_mut().fail_run_on = Some(n);
    }

    pub fn set_stop_fails(&self, fails: bool) {
        self.state.borrow_mut().stop_fails = fails;
    }

    /// Called with the context on every successful run
    pub fn on_run(&self, hook: impl FnMut(&mut Context) + 'static) {
        self.state.borrow_mut().on_run = Some(Box::new(hook));
    }

    pub fn starts(&self) -> usize {
        self.state.borrow().starts
    }

    /// Run invocations, failing ones included
    pub fn runs(&self) -> usize {
        self.state.borrow().runs
    }

    /// Stop invocations, cleanup after a failed start included
    pub fn stops(&self) -> usize {
        self.state.borrow().stops
    }
}

/// The [`App`] side of a [`Probe`]
pub struct ProbeApp {
    state: Rc<RefCell<ProbeState>>,
}

impl App for ProbeApp {
    fn start(&mut self, _ctx: &mut Context) -> Result<bool, AppError> {
        let mut state = self.state.borrow_mut();
        state.starts += 1;
        state.start_result
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        let (fails, hook) = {
            let mut state = self.state.borrow_mut();
            state.runs += 1;
            let fails = state.run_fails || state.fail_run_on == Some(state.runs);
            (fails, state.on_run.take())
        };
        if fails {
            if let Some(hook) = hook {
                self.state.borrow_mut().on_run.get_or_insert(hook);
            }
            return Err(AppError::Invalid("probe run failed"));
        }

        if let Some(mut hook) = hook {
            hook(ctx);
            self.state.borrow_mut().on_run.get_or_insert(hook);
        }
        Ok(())
    }

    fn stop(&mut self, _ctx: &mut Context) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        state.stops += 1;
        if state.stop_fails {
            Err(AppError::Invalid("probe stop failed"))
        } else {
            Ok(())
        }
    }
}
