use quiz_portal::storage::{FileStorage, KeyValueStore, MemoryStorage};
use std::fs;

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        assert!(storage.get("user").is_none());
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        storage.set("user", r#"{"email":"u@example.com"}"#).unwrap();
        storage.set("isAuthenticated", "true").unwrap();

        assert_eq!(
            storage.get("user").as_deref(),
            Some(r#"{"email":"u@example.com"}"#)
        );
        assert_eq!(storage.get("isAuthenticated").as_deref(), Some("true"));

        storage.remove("user").unwrap();
        assert!(storage.get("user").is_none());
        assert_eq!(storage.get("isAuthenticated").as_deref(), Some("true"));

        // Removing an absent key is not an error.
        storage.remove("never-set").unwrap();
    }

    #[test]
    fn test_values_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("session.json");

        FileStorage::new(&path).set("authToken", "tok").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("authToken").as_deref(), Some("tok"));
        // No temporary file left behind.
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();
        let storage = FileStorage::new(&path);

        assert!(storage.get("user").is_none());

        storage.set("user", "fresh").unwrap();
        assert_eq!(storage.get("user").as_deref(), Some("fresh"));
    }

    #[test]
    fn test_unwritable_location_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory is needed.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let storage = FileStorage::new(blocker.join("session.json"));

        assert!(storage.set("user", "x").is_err());
    }
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set("user", "u").unwrap();
        storage.set("user", "v").unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("user").as_deref(), Some("v"));

        storage.remove("user").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_failure_mode() {
        let storage = MemoryStorage::new_failing();

        assert!(storage.set("user", "u").is_err());
        assert!(storage.remove("user").is_err());
        assert!(storage.get("user").is_none());
    }
}
