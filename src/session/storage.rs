use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::models::LoginResponse;

pub const TOKEN_KEY: &str = "token";
pub const EMAIL_KEY: &str = "email";
pub const USERNAME_KEY: &str = "username";
pub const ROLE_KEY: &str = "role";
pub const ROLE_ID_KEY: &str = "roleId";

/// Every key written on login and removed on logout.
pub const SESSION_KEYS: [&str; 5] = [TOKEN_KEY, EMAIL_KEY, USERNAME_KEY, ROLE_KEY, ROLE_ID_KEY];

/// String-valued key/value persistence for the session record.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    fn remove(&self, key: &str) -> anyhow::Result<()>;

    fn set_all(&self, entries: &[(&str, String)]) -> anyhow::Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> anyhow::Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Writes the five session keys together from a login response.
pub fn persist_login(storage: &dyn KeyValueStorage, response: &LoginResponse) -> anyhow::Result<()> {
    let user = &response.user;
    storage.set_all(&[
        (TOKEN_KEY, response.token.clone()),
        (EMAIL_KEY, user.email.clone()),
        (USERNAME_KEY, user.username.clone()),
        (ROLE_ID_KEY, user.role.as_ref().map(|role| role.id.to_string()).unwrap_or_default()),
        (ROLE_KEY, user.role.as_ref().map(|role| role.name.clone()).unwrap_or_default()),
    ])
}

pub fn forget_login(storage: &dyn KeyValueStorage) -> anyhow::Result<()> {
    storage.remove_all(&SESSION_KEYS)
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("TASKDESK_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("taskdesk")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// JSON object file holding the persisted session keys.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` inside the configuration directory.
    pub fn in_config_dir() -> anyhow::Result<Self> {
        Ok(Self::new(get_config_dir()?.join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)?;
        Ok(entries)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.set_all(&[(key, value.to_string())])
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.remove_all(&[key])
    }

    fn set_all(&self, entries: &[(&str, String)]) -> anyhow::Result<()> {
        let mut stored = self.load()?;
        for (key, value) in entries {
            stored.insert((*key).to_string(), value.clone());
        }
        self.save(&stored)
    }

    fn remove_all(&self, keys: &[&str]) -> anyhow::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut stored = self.load()?;
        for key in keys {
            stored.remove(*key);
        }
        self.save(&stored)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();
        {
            let mut map = storage.lock();
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        }
        storage
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoginResponse, LoginUser, Role};

    fn sample_login() -> LoginResponse {
        LoginResponse {
            token: "tok".into(),
            user: LoginUser {
                email: "a@b.com".into(),
                username: "alice".into(),
                role: Some(Role { id: 1, name: "pm".into() }),
            },
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("taskdesk-test-{}-{}", std::process::id(), name))
            .join("session.json")
    }

    #[test]
    fn persist_login_writes_all_five_keys() {
        let storage = MemoryStorage::new();
        persist_login(&storage, &sample_login()).unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        assert_eq!(storage.get(EMAIL_KEY).unwrap().as_deref(), Some("a@b.com"));
        assert_eq!(storage.get(USERNAME_KEY).unwrap().as_deref(), Some("alice"));
        assert_eq!(storage.get(ROLE_KEY).unwrap().as_deref(), Some("pm"));
        assert_eq!(storage.get(ROLE_ID_KEY).unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn forget_login_removes_every_key() {
        let storage = MemoryStorage::new();
        persist_login(&storage, &sample_login()).unwrap();
        storage.set("theme", "dark").unwrap();

        forget_login(&storage).unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn file_storage_round_trips_through_disk() {
        let path = temp_file("roundtrip");
        let _ = fs::remove_file(&path);
        let storage = FileStorage::new(&path);

        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        persist_login(&storage, &sample_login()).unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get(EMAIL_KEY).unwrap().as_deref(), Some("a@b.com"));

        forget_login(&reopened).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_storage_remove_without_file_is_noop() {
        let path = temp_file("missing");
        let _ = fs::remove_file(&path);
        let storage = FileStorage::new(&path);
        forget_login(&storage).unwrap();
        assert!(!path.exists());
    }
}
