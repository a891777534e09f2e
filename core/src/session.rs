//! Persisted client session: tokens, role, and identity.
//!
//! # Design
//! The session is an explicit object injected into `ApiClient` rather than
//! ambient global storage. Writes go through `set_all` and `clear_all`, each
//! of which holds one write lock for the whole field set, so readers never
//! observe a half-written or half-cleared session.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

/// The fixed set of session keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    AdminToken,
    UserToken,
    UserRole,
    UserId,
    UserName,
    UserEmail,
}

impl SessionField {
    pub const ALL: [SessionField; 6] = [
        SessionField::AdminToken,
        SessionField::UserToken,
        SessionField::UserRole,
        SessionField::UserId,
        SessionField::UserName,
        SessionField::UserEmail,
    ];

    /// Storage key for this field.
    pub fn key(self) -> &'static str {
        match self {
            SessionField::AdminToken => "adminToken",
            SessionField::UserToken => "userToken",
            SessionField::UserRole => "userRole",
            SessionField::UserId => "userId",
            SessionField::UserName => "userName",
            SessionField::UserEmail => "userEmail",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Key/value session storage shared by the client and the auth facade.
pub trait SessionStore: Send + Sync {
    fn get(&self, field: SessionField) -> Option<String>;

    /// Write every supplied field at once. Fields not supplied are untouched.
    fn set_all(&self, fields: &[(SessionField, String)]);

    /// Remove all six fields, then write the supplied ones, as one update.
    fn replace_all(&self, fields: &[(SessionField, String)]);

    /// Remove all six fields at once.
    fn clear_all(&self);

    /// Bearer token for outgoing requests: the admin token when present,
    /// otherwise the user token. Empty values count as absent.
    fn bearer_token(&self) -> Option<String> {
        [SessionField::AdminToken, SessionField::UserToken]
            .into_iter()
            .filter_map(|field| self.get(field))
            .find(|token| !token.is_empty())
    }
}

/// In-process session storage.
#[derive(Debug, Default)]
pub struct MemorySession {
    fields: RwLock<HashMap<SessionField, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, field: SessionField) -> Option<String> {
        self.fields.read().get(&field).cloned()
    }

    fn set_all(&self, fields: &[(SessionField, String)]) {
        let mut map = self.fields.write();
        for (field, value) in fields {
            map.insert(*field, value.clone());
        }
    }

    fn replace_all(&self, fields: &[(SessionField, String)]) {
        let mut map = self.fields.write();
        map.clear();
        map.extend(fields.iter().cloned());
    }

    fn clear_all(&self) {
        self.fields.write().clear();
    }
}

/// Session storage mirrored to a JSON file so it survives restarts.
///
/// The in-memory copy is authoritative for the running process. A failed
/// file write is logged and otherwise ignored.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    fields: RwLock<HashMap<SessionField, String>>,
}

impl FileSession {
    /// Open the session file at `path`, starting empty if it does not exist.
    /// Unknown keys in the file are ignored.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let fields = match fs::read_to_string(&path) {
            Ok(text) => {
                let raw: HashMap<String, String> = serde_json::from_str(&text)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                raw.into_iter()
                    .filter_map(|(k, v)| SessionField::from_key(&k).map(|f| (f, v)))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            path,
            fields: RwLock::new(fields),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, fields: &HashMap<SessionField, String>) {
        let raw: HashMap<&str, &str> = fields
            .iter()
            .map(|(f, v)| (f.key(), v.as_str()))
            .collect();
        let result = serde_json::to_string_pretty(&raw)
            .map_err(std::io::Error::other)
            .and_then(|text| fs::write(&self.path, text));
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }
}

impl SessionStore for FileSession {
    fn get(&self, field: SessionField) -> Option<String> {
        self.fields.read().get(&field).cloned()
    }

    fn set_all(&self, fields: &[(SessionField, String)]) {
        let mut map = self.fields.write();
        for (field, value) in fields {
            map.insert(*field, value.clone());
        }
        self.persist(&map);
    }

    fn replace_all(&self, fields: &[(SessionField, String)]) {
        let mut map = self.fields.write();
        map.clear();
        map.extend(fields.iter().cloned());
        self.persist(&map);
    }

    fn clear_all(&self) {
        let mut map = self.fields.write();
        map.clear();
        self.persist(&map);
    }
}
