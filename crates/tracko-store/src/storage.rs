//! 鍵值儲存後端

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Result, StoreError};

/// 鍵值儲存（每個鍵存放一個完整集合的 JSON）
pub trait KeyValueStorage {
    /// 讀取；鍵不存在時回傳 `None`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 寫入（覆蓋）
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// 刪除；鍵不存在時不視為錯誤
    fn remove(&mut self, key: &str) -> Result<()>;

    /// 所有鍵（排序）
    fn keys(&self) -> Result<Vec<String>>;
}

/// 檔案儲存：`<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// 開啟資料目錄（不存在時建立）
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!("資料目錄: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // 寫入暫存檔後改名
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// 記憶體儲存（測試與一次性計算用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path().join("data")).unwrap();

        assert_eq!(storage.get("tracko_orders").unwrap(), None);

        storage.set("tracko_orders", "[]").unwrap();
        storage.set("tracko_prices", "[1]").unwrap();

        assert_eq!(storage.get("tracko_orders").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("data/tracko_prices.json").exists());
        assert_eq!(storage.keys().unwrap(), vec!["tracko_orders", "tracko_prices"]);

        storage.remove("tracko_orders").unwrap();
        storage.remove("tracko_orders").unwrap();
        assert_eq!(storage.get("tracko_orders").unwrap(), None);
    }

    #[rstest]
    #[case("../escape")]
    #[case("a/b")]
    #[case("")]
    #[case("tracko orders")]
    fn test_file_storage_rejects_invalid_keys(#[case] key: &str) {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();

        assert!(matches!(storage.set(key, "{}"), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        storage.set("b", "2").unwrap();
        storage.set("a", "1").unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
    }
}
