//! Encryption-envelope structural validation
//!
//! An encrypted backup is a JSON object pinned at version "1.0" with
//! `encrypted: true` and the four payload fields `encryptedData`,
//! `salt`, `iv`, `tag`. A partially-satisfied contract is corruption,
//! not merely an unencrypted backup.

use crate::artifact::BackupArtifact;
use crate::checks::{ArtifactCheck, CheckCategory, CheckDetails, CheckItem, CheckStatus, Severity};
use crate::store::ArtifactStore;
use async_trait::async_trait;
use std::time::Instant;

/// Pinned envelope format version
pub const ENVELOPE_VERSION: &str = "1.0";

const REQUIRED_FIELDS: [&str; 4] = ["encryptedData", "salt", "iv", "tag"];

/// Structural classification of an artifact's bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// Well-formed encrypted envelope
    Valid,
    /// Claims to be an encrypted envelope but lacks required fields
    Malformed { missing: Vec<String> },
    /// Parseable but does not claim to be encrypted
    Unencrypted,
    /// Not JSON at all (likely a plain binary backup)
    Unparseable,
}

/// Classify artifact bytes against the envelope contract.
///
/// Parse failure means "not an envelope", never an error; binary SQLite
/// files land here routinely.
pub fn classify_envelope(data: &[u8]) -> EnvelopeShape {
    let value: serde_json::Value = match serde_json::from_slice(data) {
        Ok(value) => value,
        Err(_) => return EnvelopeShape::Unparseable,
    };

    let object = match value.as_object() {
        Some(object) => object,
        None => return EnvelopeShape::Unencrypted,
    };

    let claims_encrypted = object.get("encrypted").and_then(|v| v.as_bool()) == Some(true);
    let pinned_version =
        object.get("version").and_then(|v| v.as_str()) == Some(ENVELOPE_VERSION);
    if !claims_encrypted || !pinned_version {
        return EnvelopeShape::Unencrypted;
    }

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        EnvelopeShape::Valid
    } else {
        EnvelopeShape::Malformed { missing }
    }
}

/// Per-artifact encryption-envelope validator
pub struct EnvelopeCheck;

#[async_trait]
impl ArtifactCheck for EnvelopeCheck {
    fn kind(&self) -> &'static str {
        "encryption_validation"
    }

    async fn run(&self, store: &dyn ArtifactStore, artifact: &BackupArtifact) -> CheckItem {
        let started = Instant::now();
        let name = format!("{}_{}", self.kind(), artifact.name);

        let data = match store.read(&artifact.path).await {
            Ok(data) => data,
            Err(e) => {
                return CheckItem {
                    name,
                    category: CheckCategory::Security,
                    status: CheckStatus::Fail,
                    severity: Severity::Medium,
                    message: format!("could not read backup for encryption validation: {}", e),
                    details: Some(CheckDetails::Failure {
                        error: e.to_string(),
                    }),
                    duration_ms: started.elapsed().as_millis() as u64,
                };
            }
        };

        match classify_envelope(&data) {
            EnvelopeShape::Valid => CheckItem {
                name,
                category: CheckCategory::Security,
                status: CheckStatus::Pass,
                severity: Severity::Low,
                message: "backup is a well-formed encrypted envelope".to_string(),
                details: None,
                duration_ms: started.elapsed().as_millis() as u64,
            },
            EnvelopeShape::Malformed { missing } => {
                tracing::warn!(
                    "malformed encryption envelope in {}: missing {:?}",
                    artifact.name,
                    missing
                );
                CheckItem {
                    name,
                    category: CheckCategory::Integrity,
                    status: CheckStatus::Fail,
                    severity: Severity::High,
                    message: "invalid encrypted-envelope structure".to_string(),
                    details: Some(CheckDetails::Envelope {
                        missing_fields: missing,
                    }),
                    duration_ms: started.elapsed().as_millis() as u64,
                }
            }
            EnvelopeShape::Unencrypted | EnvelopeShape::Unparseable => CheckItem {
                name,
                category: CheckCategory::Security,
                status: CheckStatus::Warning,
                severity: Severity::Medium,
                message: "backup is not encrypted".to_string(),
                details: None,
                duration_ms: started.elapsed().as_millis() as u64,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_json(fields: &[&str]) -> Vec<u8> {
        let mut object = serde_json::json!({
            "encrypted": true,
            "version": "1.0",
        });
        for field in fields {
            object[*field] = serde_json::json!("deadbeef");
        }
        serde_json::to_vec(&object).unwrap()
    }

    #[test]
    fn test_valid_envelope() {
        let data = envelope_json(&["encryptedData", "salt", "iv", "tag"]);
        assert_eq!(classify_envelope(&data), EnvelopeShape::Valid);
    }

    #[test]
    fn test_missing_iv_is_malformed() {
        let data = envelope_json(&["encryptedData", "salt", "tag"]);
        assert_eq!(
            classify_envelope(&data),
            EnvelopeShape::Malformed {
                missing: vec!["iv".to_string()]
            }
        );
    }

    #[test]
    fn test_missing_several_fields() {
        let data = envelope_json(&["salt"]);
        match classify_envelope(&data) {
            EnvelopeShape::Malformed { missing } => {
                assert_eq!(missing, vec!["encryptedData", "iv", "tag"]);
            }
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_json_is_unencrypted() {
        let data = br#"{"tasks": [], "boards": []}"#;
        assert_eq!(classify_envelope(data), EnvelopeShape::Unencrypted);
    }

    #[test]
    fn test_non_object_json_is_unencrypted() {
        assert_eq!(classify_envelope(b"[1, 2, 3]"), EnvelopeShape::Unencrypted);
    }

    #[test]
    fn test_wrong_version_is_unencrypted() {
        let data = serde_json::to_vec(&serde_json::json!({
            "encrypted": true,
            "version": "2.0",
            "encryptedData": "x", "salt": "x", "iv": "x", "tag": "x",
        }))
        .unwrap();
        assert_eq!(classify_envelope(&data), EnvelopeShape::Unencrypted);
    }

    #[test]
    fn test_binary_data_is_unparseable() {
        let data = b"SQLite format 3\x00\x10\x01\x01";
        assert_eq!(classify_envelope(data), EnvelopeShape::Unparseable);
    }
}
