//! In-memory knowledge store loaded from JSON.

use cyberbot_core::error::{CyberBotError, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::normalize::normalize;

/// Read-only question → answer table.
///
/// Entries keep their load order so substring matching always returns the
/// same first hit for the same input.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(question, answer)` pairs. Questions are normalized; a
    /// later duplicate replaces the earlier answer but keeps its position.
    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: AsRef<str>,
        A: Into<String>,
    {
        let mut store = Self::new();
        for (q, a) in pairs {
            store.insert(q.as_ref(), a.into());
        }
        store
    }

    fn insert(&mut self, question: &str, answer: String) {
        let key = normalize(question);
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = answer,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, answer));
            }
        }
    }

    /// Load from a JSON object file, or a directory of `*.json` object files
    /// merged in file-name order.
    pub fn load(path: &Path) -> Result<Self> {
        let mut store = Self::new();
        if path.is_dir() {
            let mut files: Vec<_> = std::fs::read_dir(path)?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            files.sort();
            for file in files {
                store.merge_file(&file)?;
            }
        } else {
            store.merge_file(path)?;
        }
        Ok(store)
    }

    /// Like [`load`](Self::load) but never fails: a missing or broken source
    /// yields an empty store so the server can still start.
    pub fn load_or_empty(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("⚠️ Knowledge base not found at {}", path.display());
            return Self::new();
        }
        match Self::load(path) {
            Ok(store) => {
                tracing::info!("📚 Knowledge base loaded: {} entries", store.len());
                store
            }
            Err(e) => {
                tracing::warn!("⚠️ Knowledge base not available: {e}");
                Self::new()
            }
        }
    }

    fn merge_file(&mut self, file: &Path) -> Result<()> {
        let content = std::fs::read_to_string(file)?;
        let data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
            .map_err(|e| CyberBotError::Knowledge(format!("{}: {e}", file.display())))?;
        for (question, answer) in data {
            match answer {
                serde_json::Value::String(s) => self.insert(&question, s),
                other => {
                    tracing::debug!("Skipping non-string answer for '{question}': {other}");
                }
            }
        }
        Ok(())
    }

    /// Find an answer: exact match, then a stored question contained in the
    /// query, then the query contained in a stored question.
    pub fn lookup(&self, input: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let query = normalize(input);
        if query.is_empty() {
            return None;
        }

        if let Some(&i) = self.index.get(&query) {
            return Some(&self.entries[i].1);
        }
        self.entries
            .iter()
            .find(|(key, _)| query.contains(key.as_str()))
            .or_else(|| self.entries.iter().find(|(key, _)| key.contains(query.as_str())))
            .map(|(_, answer)| answer.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeStore {
        KnowledgeStore::from_pairs([
            ("What is phishing?", "Phishing tricks you into giving up secrets."),
            ("malware", "Malware is malicious software."),
            ("how to create a strong password", "Use a long passphrase."),
        ])
    }

    #[test]
    fn test_exact_match_after_normalization() {
        let kb = sample();
        assert_eq!(
            kb.lookup("  WHAT is   PHISHING!!"),
            Some("Phishing tricks you into giving up secrets.")
        );
    }

    #[test]
    fn test_key_contained_in_query() {
        let kb = sample();
        assert_eq!(
            kb.lookup("can you tell me about malware on phones"),
            Some("Malware is malicious software.")
        );
    }

    #[test]
    fn test_query_contained_in_key() {
        let kb = sample();
        assert_eq!(kb.lookup("strong password"), Some("Use a long passphrase."));
    }

    #[test]
    fn test_no_match_and_empty_inputs() {
        let kb = sample();
        assert_eq!(kb.lookup("quantum cooking recipes"), None);
        assert_eq!(kb.lookup(""), None);
        assert_eq!(kb.lookup("???"), None);
        assert_eq!(KnowledgeStore::new().lookup("malware"), None);
    }

    #[test]
    fn test_lookup_idempotent() {
        let kb = sample();
        let first = kb.lookup("tell me about malware").map(str::to_string);
        for _ in 0..5 {
            assert_eq!(kb.lookup("tell me about malware").map(str::to_string), first);
        }
    }

    #[test]
    fn test_first_seen_wins() {
        let kb = KnowledgeStore::from_pairs([("virus", "first"), ("computer virus", "second")]);
        // Both keys are contained in the query; load order decides.
        assert_eq!(kb.lookup("is a computer virus dangerous"), Some("first"));
    }

    #[test]
    fn test_duplicate_keys_override() {
        let kb = KnowledgeStore::from_pairs([("VPN", "old"), ("vpn?", "new")]);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.lookup("vpn"), Some("new"));
    }

    #[test]
    fn test_load_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("kb.json");
        std::fs::write(&file, r#"{"What is 2FA?": "Two-factor authentication.", "bad": 3}"#).unwrap();

        let kb = KnowledgeStore::load(&file).unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.lookup("what is 2fa"), Some("Two-factor authentication."));
    }

    #[test]
    fn test_load_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("kb.json");
        std::fs::write(&file, r#"{"virus": "first in file", "computer virus": "second in file"}"#)
            .unwrap();

        let kb = KnowledgeStore::load(&file).unwrap();
        assert_eq!(kb.lookup("is a computer virus dangerous"), Some("first in file"));

        std::fs::write(&file, r#"{"computer virus": "first in file", "virus": "second in file"}"#)
            .unwrap();
        let kb = KnowledgeStore::load(&file).unwrap();
        assert_eq!(kb.lookup("is a computer virus dangerous"), Some("first in file"));
    }

    #[test]
    fn test_load_directory_merges_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"firewall": "from b"}"#).unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"firewall": "from a", "ransomware": "a"}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let kb = KnowledgeStore::load(dir.path()).unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.lookup("firewall"), Some("from b"));
    }

    #[test]
    fn test_invalid_json_is_error_but_load_or_empty_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("kb.json");
        std::fs::write(&file, "").unwrap();

        assert!(KnowledgeStore::load(&file).is_err());
        assert!(KnowledgeStore::load_or_empty(&file).is_empty());
        assert!(KnowledgeStore::load_or_empty(&dir.path().join("missing.json")).is_empty());
    }
}
