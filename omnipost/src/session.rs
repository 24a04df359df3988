//! Session context: where the access and refresh credentials live between calls.
//!
//! Credentials are kept in two named slots of a [`CredentialStore`]. The store is the only
//! process-wide mutable state the gateway client depends on; there is no locking discipline
//! across slots, so the last writer wins.

use crate::error::ApiError;
use crate::models::AuthTokens;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const ACCESS_TOKEN_SLOT: &str = "accessToken";
pub const REFRESH_TOKEN_SLOT: &str = "refreshToken";

/// Durable key/value storage for credential slots
pub trait CredentialStore: Send + Sync {
    fn load(&self, slot: &str) -> Result<Option<String>, ApiError>;
    fn save(&self, slot: &str, value: &str) -> Result<(), ApiError>;
    fn remove(&self, slot: &str) -> Result<(), ApiError>;
}

/// Process-local store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self, slot: &str) -> Result<Option<String>, ApiError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(slot).cloned())
    }

    fn save(&self, slot: &str, value: &str) -> Result<(), ApiError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), ApiError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(slot);
        Ok(())
    }
}

/// Slots persisted as a single JSON object file, rewritten on every change.
///
/// A missing file reads as "all slots empty". On unix the file is created readable by the owner
/// only.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStore {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self) -> Result<BTreeMap<String, String>, ApiError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&raw).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{}: {}", self.path.display(), e),
            )
            .into()
        })
    }

    fn write_slots(&self, slots: &BTreeMap<String, String>) -> Result<(), ApiError> {
        let mut opts = fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        let mut file = opts.open(&self.path)?;
        // mode() only applies on creation; an existing file may be looser
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(&serde_json::to_vec_pretty(slots)?)?;
        file.sync_all()?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), ApiError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.read_slots()?;
        f(&mut slots);
        self.write_slots(&slots)
    }
}

impl CredentialStore for FileStore {
    fn load(&self, slot: &str) -> Result<Option<String>, ApiError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_slots()?.remove(slot))
    }

    fn save(&self, slot: &str, value: &str) -> Result<(), ApiError> {
        self.update(|slots| {
            slots.insert(slot.to_string(), value.to_string());
        })
    }

    fn remove(&self, slot: &str) -> Result<(), ApiError> {
        self.update(|slots| {
            slots.remove(slot);
        })
    }
}

type ExpiryHook = Box<dyn Fn() + Send + Sync>;

/// Explicit session context held by [`crate::ApiClient`].
pub struct Session {
    store: Box<dyn CredentialStore>,
    on_expired: Option<ExpiryHook>,
}

impl Session {
    pub fn new<S: CredentialStore + 'static>(store: S) -> Self {
        Session {
            store: Box::new(store),
            on_expired: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Registers a callback fired whenever the session is torn down because a refresh failed.
    /// This is the hook for sending the user back to the login entry point.
    pub fn with_expiry_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_expired = Some(Box::new(hook));
        self
    }

    pub fn access_token(&self) -> Result<Option<String>, ApiError> {
        self.store.load(ACCESS_TOKEN_SLOT)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, ApiError> {
        self.store.load(REFRESH_TOKEN_SLOT)
    }

    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.access_token()?.is_some())
    }

    /// Overwrites both slots
    pub fn set_tokens(&self, tokens: &AuthTokens) -> Result<(), ApiError> {
        self.store.save(ACCESS_TOKEN_SLOT, &tokens.accessToken)?;
        self.store.save(REFRESH_TOKEN_SLOT, &tokens.refreshToken)?;
        Ok(())
    }

    /// Empties both slots. Attempts both removals even if the first one fails.
    pub fn clear(&self) -> Result<(), ApiError> {
        let access = self.store.remove(ACCESS_TOKEN_SLOT);
        let refresh = self.store.remove(REFRESH_TOKEN_SLOT);
        access.and(refresh)
    }

    /// Forces the session back to unauthenticated and notifies the expiry hook.
    pub(crate) fn expire(&self) {
        info!("session expired, clearing stored credentials");
        if let Err(e) = self.clear() {
            warn!("failed to clear stored credentials: {e}");
        }
        if let Some(hook) = &self.on_expired {
            hook();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("on_expired", &self.on_expired.is_some())
            .finish_non_exhaustive()
    }
}
