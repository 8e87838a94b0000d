//! Speaker registry
//!
//! A persisted mapping from speaker name to reference-sample path plus
//! metadata, backed by a single JSON document (`speakers.json`) under the
//! registry root. Every mutation is written through to disk before it is
//! visible to readers: the mutated map is persisted to a temporary file and
//! atomically renamed over the committed document, so a crash mid-write
//! leaves the prior state intact. A `tokio::sync::RwLock` serializes
//! writers; reads are served from the in-memory copy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{RegistryError, RegistryResult};

/// Committed document file name under the registry root
const DOCUMENT_NAME: &str = "speakers.json";

/// File name of the per-speaker fallback copy written by repair
const REPAIR_SAMPLE_NAME: &str = "sample.wav";

/// One registered speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerProfile {
    /// Unique name, the registry key
    pub name: String,
    /// Reference sample on disk; may transiently dangle until repair runs
    pub sample_path: PathBuf,
    /// Language code the sample was spoken in, e.g. "pt", "en"
    pub language: String,
    /// Open metadata map
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Outcome of one `repair_on_startup` pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
    /// Profiles whose dangling sample was replaced with a fallback copy
    pub repaired: Vec<String>,
    /// Profiles still pointing at a missing file (fallback unavailable)
    pub still_invalid: Vec<String>,
    /// Profiles whose sample was present and untouched
    pub unchanged: usize,
}

impl RepairReport {
    /// True when the pass changed nothing on disk
    pub fn is_noop(&self) -> bool {
        self.repaired.is_empty()
    }
}

/// Process-wide speaker registry state
///
/// The embedding service creates one instance at startup and shares it by
/// reference with every caller.
pub struct SpeakerRegistry {
    root: PathBuf,
    document_path: PathBuf,
    /// Fallback reference sample copied over dangling profiles by repair
    fallback_sample: Option<PathBuf>,
    profiles: RwLock<BTreeMap<String, SpeakerProfile>>,
}

impl SpeakerRegistry {
    /// Open (or initialize) the registry under `root`
    ///
    /// A missing document means an empty registry; an unparseable one is a
    /// `Corrupt` error, never silently reinitialized over user state.
    pub async fn open(
        root: impl Into<PathBuf>,
        fallback_sample: Option<PathBuf>,
    ) -> RegistryResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        let document_path = root.join(DOCUMENT_NAME);

        let profiles = match tokio::fs::read(&document_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                RegistryError::Corrupt(format!(
                    "{} is not a valid registry document: {}",
                    document_path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(RegistryError::Io(e)),
        };

        info!(
            root = %root.display(),
            speakers = profiles.len(),
            "Speaker registry opened"
        );

        Ok(Self {
            root,
            document_path,
            fallback_sample,
            profiles: RwLock::new(profiles),
        })
    }

    /// Register a new speaker; name collision is a hard error
    pub async fn register(
        &self,
        name: &str,
        sample_path: impl Into<PathBuf>,
        language: &str,
        properties: BTreeMap<String, String>,
    ) -> RegistryResult<()> {
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidName(
                "Speaker name must be non-empty".to_string(),
            ));
        }

        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }

        // Mutate a copy, persist it, then commit: a failed write must not
        // leave the in-memory map ahead of the document
        let mut updated = profiles.clone();
        updated.insert(
            name.to_string(),
            SpeakerProfile {
                name: name.to_string(),
                sample_path: sample_path.into(),
                language: language.to_string(),
                properties,
            },
        );
        self.persist(&updated).await?;
        *profiles = updated;

        info!(speaker = name, language, "Speaker registered");
        Ok(())
    }

    /// Partially update a speaker; omitted fields keep their prior value,
    /// supplied properties are merged key-by-key
    pub async fn update(
        &self,
        name: &str,
        sample_path: Option<PathBuf>,
        properties: Option<BTreeMap<String, String>>,
    ) -> RegistryResult<()> {
        let mut profiles = self.profiles.write().await;
        if !profiles.contains_key(name) {
            return Err(RegistryError::NotFound(name.to_string()));
        }

        let mut updated = profiles.clone();
        if let Some(profile) = updated.get_mut(name) {
            if let Some(path) = sample_path {
                profile.sample_path = path;
            }
            if let Some(props) = properties {
                for (key, value) in props {
                    profile.properties.insert(key, value);
                }
            }
        }
        self.persist(&updated).await?;
        *profiles = updated;

        info!(speaker = name, "Speaker updated");
        Ok(())
    }

    /// Delete a speaker and its sample file
    ///
    /// The sample file missing from disk is not an error; the profile is
    /// removed either way.
    pub async fn delete(&self, name: &str) -> RegistryResult<()> {
        let mut profiles = self.profiles.write().await;
        let profile = match profiles.get(name) {
            Some(p) => p.clone(),
            None => return Err(RegistryError::NotFound(name.to_string())),
        };

        let mut updated = profiles.clone();
        updated.remove(name);
        self.persist(&updated).await?;
        *profiles = updated;
        drop(profiles);

        match tokio::fs::remove_file(&profile.sample_path).await {
            Ok(()) => debug!(
                speaker = name,
                sample = %profile.sample_path.display(),
                "Deleted speaker sample file"
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                speaker = name,
                sample = %profile.sample_path.display(),
                error = %e,
                "Could not delete speaker sample file"
            ),
        }

        info!(speaker = name, "Speaker deleted");
        Ok(())
    }

    /// Read one profile
    pub async fn get(&self, name: &str) -> RegistryResult<SpeakerProfile> {
        self.profiles
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Read-only snapshot of every profile
    pub async fn list(&self) -> BTreeMap<String, SpeakerProfile> {
        self.profiles.read().await.clone()
    }

    /// Replace dangling sample paths with copies of the fallback sample
    ///
    /// For every profile whose sample is missing from disk, the fallback is
    /// copied to `<root>/<name>/sample.wav` and the profile rewritten to
    /// point at it. Profiles that cannot be repaired are logged and left in
    /// place; startup is never blocked. The document is re-persisted only
    /// when at least one profile changed, so a second pass with no
    /// intervening file changes writes nothing.
    pub async fn repair_on_startup(&self) -> RegistryResult<RepairReport> {
        let mut profiles = self.profiles.write().await;
        let mut updated = profiles.clone();
        let mut report = RepairReport::default();

        for (name, profile) in updated.iter_mut() {
            if tokio::fs::try_exists(&profile.sample_path)
                .await
                .unwrap_or(false)
            {
                report.unchanged += 1;
                continue;
            }

            let fallback = match &self.fallback_sample {
                Some(path) if path.exists() => path.clone(),
                _ => {
                    warn!(
                        speaker = name,
                        sample = %profile.sample_path.display(),
                        "Speaker sample missing and no fallback available; profile is invalid"
                    );
                    report.still_invalid.push(name.clone());
                    continue;
                }
            };

            let speaker_dir = self.root.join(name);
            let replacement = speaker_dir.join(REPAIR_SAMPLE_NAME);
            let copy = async {
                tokio::fs::create_dir_all(&speaker_dir).await?;
                tokio::fs::copy(&fallback, &replacement).await
            };
            match copy.await {
                Ok(_) => {
                    info!(
                        speaker = name,
                        old = %profile.sample_path.display(),
                        new = %replacement.display(),
                        "Repaired dangling speaker sample from fallback"
                    );
                    profile.sample_path = replacement;
                    report.repaired.push(name.clone());
                }
                Err(e) => {
                    error!(
                        speaker = name,
                        fallback = %fallback.display(),
                        error = %e,
                        "Failed to copy fallback sample; profile is invalid"
                    );
                    report.still_invalid.push(name.clone());
                }
            }
        }

        if !report.is_noop() {
            self.persist(&updated).await?;
            *profiles = updated;
        }

        info!(
            repaired = report.repaired.len(),
            still_invalid = report.still_invalid.len(),
            unchanged = report.unchanged,
            "Registry repair pass complete"
        );
        Ok(report)
    }

    /// Write-then-rename the document so the committed state is always
    /// either the old or the new map, never a torn write
    async fn persist(&self, profiles: &BTreeMap<String, SpeakerProfile>) -> RegistryResult<()> {
        let json = serde_json::to_vec_pretty(profiles)
            .map_err(|e| RegistryError::Persistence(format!("Serialize failed: {}", e)))?;

        let temp_path = self.document_path.with_extension("json.tmp");
        if let Err(e) = tokio::fs::write(&temp_path, &json).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(RegistryError::Persistence(format!(
                "Failed to write {}: {}",
                temp_path.display(),
                e
            )));
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &self.document_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(RegistryError::Persistence(format!(
                "Failed to commit {}: {}",
                self.document_path.display(),
                e
            )));
        }
        debug!(
            document = %self.document_path.display(),
            speakers = profiles.len(),
            "Registry document persisted"
        );
        Ok(())
    }
}
