//! Leaderboard persistence
//!
//! Backends:
//! - `LocalStore`: browser LocalStorage (wasm)
//! - `FileStore`: JSON file (native)
//! - `MemoryStore`: process-local, always available
//! - `FallbackStore`: primary backend with a secondary to fall back on
//! - `remote`: fire-and-forget HTTP leaderboard (wasm)
//!
//! Storage failures are logged and recovered here; they never reach the
//! simulation.

#[cfg(target_arch = "wasm32")]
pub mod remote;

use std::cell::RefCell;
use std::fmt;

use crate::highscores::Leaderboard;

/// Storage failure
#[derive(Debug)]
pub enum StoreError {
    /// Backend not present (no window, no LocalStorage, ...)
    Unavailable,
    Io(std::io::Error),
    Serde(serde_json::Error),
    Remote(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "storage unavailable"),
            StoreError::Io(e) => write!(f, "storage io error: {e}"),
            StoreError::Serde(e) => write!(f, "corrupt leaderboard data: {e}"),
            StoreError::Remote(msg) => write!(f, "remote leaderboard error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e)
    }
}

/// Somewhere a leaderboard can be loaded from and saved to
pub trait ScoreStore {
    fn load(&self) -> Result<Leaderboard, StoreError>;
    fn save(&self, board: &Leaderboard) -> Result<(), StoreError>;
    /// Backend name for logs
    fn label(&self) -> &'static str;
}

/// Load a board, add a score, write it back.
///
/// Returns the updated board and the rank achieved. Load failures start from
/// an empty board; save failures are logged.
pub fn record_score(store: &dyn ScoreStore, name: &str, score: u64) -> (Leaderboard, Option<usize>) {
    let mut board = store.load().unwrap_or_else(|e| {
        log::warn!("{}: load failed ({e}), starting fresh", store.label());
        Leaderboard::new()
    });
    let rank = board.add_score(name, score);
    if rank.is_some() {
        match store.save(&board) {
            Ok(()) => log::info!("High scores saved ({} entries)", board.entries.len()),
            Err(e) => log::warn!("{}: save failed: {e}", store.label()),
        }
    }
    (board, rank)
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    board: RefCell<Leaderboard>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<Leaderboard, StoreError> {
        Ok(self.board.borrow().clone())
    }

    fn save(&self, board: &Leaderboard) -> Result<(), StoreError> {
        *self.board.borrow_mut() = board.clone();
        Ok(())
    }

    fn label(&self) -> &'static str {
        "memory"
    }
}

/// Tries `primary`, falls back to `secondary` on any error
#[derive(Debug)]
pub struct FallbackStore<P, S> {
    pub primary: P,
    pub secondary: S,
}

impl<P: ScoreStore, S: ScoreStore> FallbackStore<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: ScoreStore, S: ScoreStore> ScoreStore for FallbackStore<P, S> {
    fn load(&self) -> Result<Leaderboard, StoreError> {
        self.primary.load().or_else(|e| {
            log::warn!(
                "{} load failed ({e}), falling back to {}",
                self.primary.label(),
                self.secondary.label()
            );
            self.secondary.load()
        })
    }

    fn save(&self, board: &Leaderboard) -> Result<(), StoreError> {
        self.primary.save(board).or_else(|e| {
            log::warn!(
                "{} save failed ({e}), falling back to {}",
                self.primary.label(),
                self.secondary.label()
            );
            self.secondary.save(board)
        })
    }

    fn label(&self) -> &'static str {
        self.primary.label()
    }
}

/// JSON file on disk
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ScoreStore for FileStore {
    fn load(&self) -> Result<Leaderboard, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => {
                let entries = serde_json::from_str(&json)?;
                Ok(Leaderboard::from_entries(entries))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Leaderboard::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, board: &Leaderboard) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(board)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn label(&self) -> &'static str {
        "file"
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStore {
    key: &'static str,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// LocalStorage key
    pub const DEFAULT_KEY: &'static str = "kwmerio_scores";

    pub fn new() -> Self {
        Self {
            key: Self::DEFAULT_KEY,
        }
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStore {
    fn load(&self) -> Result<Leaderboard, StoreError> {
        let storage = Self::storage()?;
        match storage.get_item(self.key) {
            Ok(Some(json)) => {
                let entries = serde_json::from_str(&json)?;
                Ok(Leaderboard::from_entries(entries))
            }
            Ok(None) => Ok(Leaderboard::new()),
            Err(_) => Err(StoreError::Unavailable),
        }
    }

    fn save(&self, board: &Leaderboard) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(board)?;
        storage
            .set_item(self.key, &json)
            .map_err(|_| StoreError::Unavailable)
    }

    fn label(&self) -> &'static str {
        "localStorage"
    }
}
