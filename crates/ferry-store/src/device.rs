//! Typed facade over the secure and plain stores.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ferry_config::FerryConfig;
use ferry_core::{AppKind, DailyCount, PendingCheckIn, Session};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::{FileStore, KeyValueStore, KeyringStore, MemoryStore};

const ACCESS_TOKEN: &str = "access_token";
const REFRESH_TOKEN: &str = "refresh_token";
const PROFILE: &str = "profile";
const VERIFICATION_COUNT: &str = "verification_count";
const OFFLINE_QUEUE: &str = "offline_queue";
const LANGUAGE: &str = "language";
const THEME: &str = "theme";

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_THEME: &str = "light";

/// Everything the client keeps on the device.
///
/// Tokens go to the secure store; if that store fails, the plain store is
/// used instead so the device stays logged in. Profile, counters, queue and
/// preferences always live in the plain store.
#[derive(Clone)]
pub struct DeviceStorage {
    secure: Arc<dyn KeyValueStore>,
    plain: Arc<dyn KeyValueStore>,
    prefix: &'static str,
}

impl std::fmt::Debug for DeviceStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceStorage")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl DeviceStorage {
    #[must_use]
    pub fn new(
        secure: Arc<dyn KeyValueStore>,
        plain: Arc<dyn KeyValueStore>,
        app: AppKind,
    ) -> Self {
        Self {
            secure,
            plain,
            prefix: app.storage_prefix(),
        }
    }

    /// Storage that lives only as long as the process.
    #[must_use]
    pub fn in_memory(app: AppKind) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            app,
        )
    }

    /// Open the stores described by `config`: keychain (or the plain file when
    /// `storage.use_keyring` is off) for tokens, `<data_dir>/store.json` for the rest.
    ///
    /// A keychain that cannot read back what it wrote (no platform backend,
    /// a session-less keyutils) is replaced by the plain file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Other`] if no data directory can be resolved.
    pub fn open(config: &FerryConfig) -> Result<Self, StoreError> {
        let dir = config
            .data_dir()
            .map_err(|e| StoreError::Other(e.to_string()))?;
        let plain: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(dir));
        let secure: Arc<dyn KeyValueStore> = if config.storage.use_keyring {
            secure_or_plain(
                Arc::new(KeyringStore::new(config.keyring_service())),
                &plain,
            )
        } else {
            Arc::clone(&plain)
        };
        Ok(Self::new(secure, plain, config.app()))
    }

    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    // --- Tokens ---

    /// Current access token, if logged in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if both the secure and plain stores fail.
    pub fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.secure_get(ACCESS_TOKEN)
    }

    /// Current refresh token, if logged in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if both the secure and plain stores fail.
    pub fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        self.secure_get(REFRESH_TOKEN)
    }

    /// Both tokens, or `None` unless both are present.
    ///
    /// # Errors
    ///
    /// See [`Self::access_token`].
    pub fn session(&self) -> Result<Option<Session>, StoreError> {
        Ok(self
            .access_token()?
            .zip(self.refresh_token()?)
            .map(|(access_token, refresh_token)| Session {
                access_token,
                refresh_token,
            }))
    }

    /// Persist a new token pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if neither store accepts the write.
    pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        let secure_write = self
            .secure
            .set(&self.key(ACCESS_TOKEN), access)
            .and_then(|()| self.secure.set(&self.key(REFRESH_TOKEN), refresh));
        if let Err(error) = secure_write {
            tracing::warn!(%error, "secure token write failed; falling back to plain storage");
            self.plain.set(&self.key(ACCESS_TOKEN), access)?;
            self.plain.set(&self.key(REFRESH_TOKEN), refresh)?;
        }
        Ok(())
    }

    /// Remove tokens from both stores.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be written. Secure
    /// store failures are ignored.
    pub fn clear_tokens(&self) -> Result<(), StoreError> {
        for name in [ACCESS_TOKEN, REFRESH_TOKEN] {
            if let Err(error) = self.secure.remove(&self.key(name)) {
                tracing::debug!(%error, key = name, "secure token delete failed");
            }
        }
        self.plain.remove(&self.key(ACCESS_TOKEN))?;
        self.plain.remove(&self.key(REFRESH_TOKEN))
    }

    /// Which store the access token came from (for status display).
    #[must_use]
    pub fn token_source(&self) -> Option<&'static str> {
        let key = self.key(ACCESS_TOKEN);
        if self.secure.get(&key).is_ok_and(|t| t.is_some()) {
            return Some("secure");
        }
        if self.plain.get(&key).is_ok_and(|t| t.is_some()) {
            return Some("plain");
        }
        None
    }

    fn secure_get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let key = self.key(name);
        match self.secure.get(&key) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.plain.get(&key),
            Err(error) => {
                tracing::warn!(%error, "secure read failed; trying plain storage");
                self.plain.get(&key)
            }
        }
    }

    // --- Profile ---

    /// Cached profile of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the cached JSON does not match `T`.
    pub fn profile<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        self.get_json(PROFILE)
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be written.
    pub fn set_profile<T: Serialize>(&self, profile: &T) -> Result<(), StoreError> {
        self.set_json(PROFILE, profile)
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be written.
    pub fn clear_profile(&self) -> Result<(), StoreError> {
        self.plain.remove(&self.key(PROFILE))
    }

    // --- Daily verification count ---

    /// Successful check-ins today (UTC).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the counter cannot be read or parsed.
    pub fn today_count(&self) -> Result<u32, StoreError> {
        self.count_on(today())
    }

    /// Add one to today's count and return the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the counter cannot be read or written.
    pub fn increment_today_count(&self) -> Result<u32, StoreError> {
        self.increment_count_on(today())
    }

    fn count_on(&self, day: NaiveDate) -> Result<u32, StoreError> {
        Ok(self
            .get_json::<DailyCount>(VERIFICATION_COUNT)?
            .map_or(0, |record| record.count_on(day)))
    }

    fn increment_count_on(&self, day: NaiveDate) -> Result<u32, StoreError> {
        let record = self
            .get_json::<DailyCount>(VERIFICATION_COUNT)?
            .unwrap_or(DailyCount {
                count: 0,
                date: day,
            })
            .incremented_on(day);
        self.set_json(VERIFICATION_COUNT, &record)?;
        Ok(record.count)
    }

    // --- Offline check-in queue ---

    /// # Errors
    ///
    /// Returns [`StoreError`] if the queue cannot be read or parsed.
    pub fn offline_queue(&self) -> Result<Vec<PendingCheckIn>, StoreError> {
        Ok(self.get_json(OFFLINE_QUEUE)?.unwrap_or_default())
    }

    /// Replace the persisted queue.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be written.
    pub fn set_offline_queue(&self, queue: &[PendingCheckIn]) -> Result<(), StoreError> {
        self.set_json(OFFLINE_QUEUE, &queue)
    }

    // --- Preferences ---

    /// UI language, `en` unless set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be read.
    pub fn language(&self) -> Result<String, StoreError> {
        Ok(self
            .plain
            .get(&self.key(LANGUAGE))?
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be written.
    pub fn set_language(&self, language: &str) -> Result<(), StoreError> {
        self.plain.set(&self.key(LANGUAGE), language)
    }

    /// UI theme, `light` unless set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be read.
    pub fn theme(&self) -> Result<String, StoreError> {
        Ok(self
            .plain
            .get(&self.key(THEME))?
            .unwrap_or_else(|| DEFAULT_THEME.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be written.
    pub fn set_theme(&self, theme: &str) -> Result<(), StoreError> {
        self.plain.set(&self.key(THEME), theme)
    }

    // --- Teardown ---

    /// Forget the session: tokens and cached profile. Counters, the offline
    /// queue and preferences survive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the plain store cannot be written.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.clear_tokens()?;
        self.clear_profile()
    }

    // --- JSON helpers ---

    fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let key = self.key(name);
        let Some(raw) = self.plain.get(&key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key,
                reason: e.to_string(),
            })
    }

    fn set_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| StoreError::Other(format!("serialize {name}: {e}")))?;
        self.plain.set(&self.key(name), &raw)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

const PROBE_KEY: &str = "ferry_store_probe";

/// `secure` if a value written through it can be read back by a later call,
/// otherwise `plain`.
fn secure_or_plain(
    secure: Arc<dyn KeyValueStore>,
    plain: &Arc<dyn KeyValueStore>,
) -> Arc<dyn KeyValueStore> {
    if retains_values(secure.as_ref()) {
        secure
    } else {
        tracing::warn!("secure store does not keep values; storing tokens in the plain store");
        Arc::clone(plain)
    }
}

fn retains_values(store: &dyn KeyValueStore) -> bool {
    if let Err(error) = store.set(PROBE_KEY, "1") {
        tracing::debug!(%error, "secure store rejected probe write");
        return false;
    }
    let kept = matches!(store.get(PROBE_KEY), Ok(Some(ref value)) if value == "1");
    if let Err(error) = store.remove(PROBE_KEY) {
        tracing::debug!(%error, "could not remove secure store probe");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::CheckerUser;
    use pretty_assertions::assert_eq;

    /// Secure store that rejects every call, like a locked keychain.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Keyring("locked".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Keyring("locked".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Keyring("locked".into()))
        }
    }

    fn checker() -> CheckerUser {
        CheckerUser {
            id: "u-1".into(),
            full_name: "Gate One".into(),
            email: "gate@ferry.test".into(),
            role: "TICKET_CHECKER".into(),
            route_id: Some(2),
            route_name: None,
        }
    }

    #[test]
    fn tokens_live_in_secure_store() {
        let secure = Arc::new(MemoryStore::new());
        let plain = Arc::new(MemoryStore::new());
        let storage = DeviceStorage::new(secure.clone(), plain.clone(), AppKind::Checker);

        storage.set_tokens("acc", "ref").unwrap();

        assert_eq!(
            secure.get("ssmspl_access_token").unwrap().as_deref(),
            Some("acc")
        );
        assert!(plain.is_empty());
        assert_eq!(storage.access_token().unwrap().as_deref(), Some("acc"));
        assert_eq!(storage.refresh_token().unwrap().as_deref(), Some("ref"));
        assert_eq!(storage.token_source(), Some("secure"));
    }

    #[test]
    fn broken_secure_store_falls_back_to_plain() {
        let plain = Arc::new(MemoryStore::new());
        let storage = DeviceStorage::new(Arc::new(BrokenStore), plain.clone(), AppKind::Customer);

        storage.set_tokens("acc", "ref").unwrap();

        assert_eq!(
            plain.get("ssmspl_customer_refresh_token").unwrap().as_deref(),
            Some("ref")
        );
        assert_eq!(
            storage.session().unwrap(),
            Some(Session {
                access_token: "acc".into(),
                refresh_token: "ref".into()
            })
        );
        assert_eq!(storage.token_source(), Some("plain"));

        storage.clear_tokens().unwrap();
        assert_eq!(storage.access_token().unwrap(), None);
    }

    #[test]
    fn clear_all_keeps_queue_and_counter() {
        let storage = DeviceStorage::in_memory(AppKind::Checker);
        storage.set_tokens("acc", "ref").unwrap();
        storage.set_profile(&checker()).unwrap();
        storage
            .set_offline_queue(&[PendingCheckIn::new("code-1")])
            .unwrap();
        storage.increment_today_count().unwrap();

        storage.clear_all().unwrap();

        assert_eq!(storage.session().unwrap(), None);
        assert_eq!(storage.profile::<CheckerUser>().unwrap(), None);
        assert_eq!(storage.offline_queue().unwrap().len(), 1);
        assert_eq!(storage.today_count().unwrap(), 1);
    }

    #[test]
    fn profile_roundtrips_through_json() {
        let storage = DeviceStorage::in_memory(AppKind::Checker);
        storage.set_profile(&checker()).unwrap();
        assert_eq!(storage.profile::<CheckerUser>().unwrap(), Some(checker()));
    }

    #[test]
    fn daily_count_resets_across_days() {
        let storage = DeviceStorage::in_memory(AppKind::Checker);
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 10, 13).unwrap();

        assert_eq!(storage.count_on(monday).unwrap(), 0);
        assert_eq!(storage.increment_count_on(monday).unwrap(), 1);
        assert_eq!(storage.increment_count_on(monday).unwrap(), 2);
        assert_eq!(storage.count_on(tuesday).unwrap(), 0);
        assert_eq!(storage.increment_count_on(tuesday).unwrap(), 1);
        assert_eq!(storage.count_on(monday).unwrap(), 0);
    }

    #[test]
    fn queue_defaults_to_empty_and_persists_entries() {
        let storage = DeviceStorage::in_memory(AppKind::Checker);
        assert!(storage.offline_queue().unwrap().is_empty());

        let queue = vec![
            PendingCheckIn::new("a"),
            PendingCheckIn {
                verification_code: "b".into(),
                retry_count: 2,
            },
        ];
        storage.set_offline_queue(&queue).unwrap();
        assert_eq!(storage.offline_queue().unwrap(), queue);
    }

    #[test]
    fn corrupt_counter_is_an_error() {
        let plain = Arc::new(MemoryStore::new());
        plain.set("ssmspl_verification_count", "nope").unwrap();
        let storage = DeviceStorage::new(Arc::new(MemoryStore::new()), plain, AppKind::Checker);
        assert!(matches!(
            storage.today_count(),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn preferences_have_defaults() {
        let storage = DeviceStorage::in_memory(AppKind::Customer);
        assert_eq!(storage.language().unwrap(), "en");
        assert_eq!(storage.theme().unwrap(), "light");
        storage.set_language("mr").unwrap();
        storage.set_theme("dark").unwrap();
        assert_eq!(storage.language().unwrap(), "mr");
        assert_eq!(storage.theme().unwrap(), "dark");
    }

    #[test]
    fn apps_do_not_share_keys() {
        let secure = Arc::new(MemoryStore::new());
        let plain = Arc::new(MemoryStore::new());
        let checker = DeviceStorage::new(secure.clone(), plain.clone(), AppKind::Checker);
        let customer = DeviceStorage::new(secure, plain, AppKind::Customer);

        checker.set_tokens("staff", "staff-ref").unwrap();
        assert_eq!(customer.access_token().unwrap(), None);
    }

    /// Accepts writes but never returns them, like keyring's mock backend.
    struct ForgetfulStore;

    impl KeyValueStore for ForgetfulStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn forgetful_secure_store_is_replaced_by_plain() {
        let plain: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let secure = secure_or_plain(Arc::new(ForgetfulStore), &plain);
        let storage = DeviceStorage::new(secure, Arc::clone(&plain), AppKind::Checker);

        storage.set_tokens("access-1", "refresh-1").unwrap();

        assert_eq!(storage.access_token().unwrap().as_deref(), Some("access-1"));
        assert_eq!(
            plain.get("ssmspl_refresh_token").unwrap().as_deref(),
            Some("refresh-1")
        );
    }

    #[test]
    fn working_secure_store_is_kept_and_probe_removed() {
        let keychain = Arc::new(MemoryStore::new());
        let plain: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let secure = secure_or_plain(keychain.clone(), &plain);
        assert!(keychain.is_empty());

        DeviceStorage::new(secure, Arc::clone(&plain), AppKind::Checker)
            .set_tokens("access-1", "refresh-1")
            .unwrap();

        assert_eq!(
            keychain.get("ssmspl_access_token").unwrap().as_deref(),
            Some("access-1")
        );
        assert_eq!(plain.get("ssmspl_access_token").unwrap(), None);
    }

    #[test]
    fn open_survives_a_keyring_without_persistence() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = FerryConfig::default();
        config.storage.use_keyring = true;
        config.storage.data_dir = Some(dir.path().display().to_string());

        let storage = DeviceStorage::open(&config).unwrap();
        storage.set_tokens("access-1", "refresh-1").unwrap();

        assert_eq!(storage.access_token().unwrap().as_deref(), Some("access-1"));
        let reopened = FileStore::in_dir(dir.path());
        assert_eq!(
            reopened.get("ssmspl_refresh_token").unwrap().as_deref(),
            Some("refresh-1")
        );
    }
}
