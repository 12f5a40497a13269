use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, warn};

use crate::store::progress::Persistence;
use crate::store::schema::{EXPORT_VERSION, ExportData, MapState, StoredDocument};

const STATE_FILE: &str = "progress.json";

/// Progress document on disk under a data directory.
#[derive(Clone, Debug)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data dir {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Load the progress document. Returns a fresh document when no file
    /// exists yet, and `None` when a file exists but cannot be read or
    /// parsed. An unusable file is moved to `progress.json.corrupt` first so
    /// the next save does not overwrite it.
    pub fn load_state(&self, first_map: &str) -> Option<MapState> {
        let path = self.file_path(STATE_FILE);
        if !path.exists() {
            return Some(MapState::new(first_map));
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("cannot read progress file {}: {e}", path.display());
                self.set_aside_unusable();
                return None;
            }
        };
        match serde_json::from_str::<StoredDocument>(&content) {
            Ok(doc) => Some(doc.into_state()),
            Err(e) => {
                warn!("unreadable progress file {}: {e}", path.display());
                self.set_aside_unusable();
                None
            }
        }
    }

    /// Rename the progress file to `progress.json.corrupt`, replacing any
    /// earlier one.
    pub fn set_aside_unusable(&self) {
        let path = self.file_path(STATE_FILE);
        let corrupt = path.with_extension("json.corrupt");
        match fs::rename(&path, &corrupt) {
            Ok(()) => warn!("kept unusable progress as {}", corrupt.display()),
            Err(e) => warn!("could not move {} aside: {e}", path.display()),
        }
    }

    pub fn save_state(&self, state: &MapState) -> Result<()> {
        let path = self.file_path(STATE_FILE);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(state)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        debug!(path = %path.display(), "progress saved");
        Ok(())
    }

    pub fn export_all(&self, state: &MapState) -> ExportData {
        ExportData {
            mathmaps_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            state: state.clone(),
        }
    }

    /// Replace the stored document with an export. The new document is
    /// staged to a `.tmp` file and the old one kept as `.bak` until the
    /// swap succeeds.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.mathmaps_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.mathmaps_export_version,
                EXPORT_VERSION
            );
        }
        if data.state.needs_reset() {
            bail!(
                "Unsupported progress schema: {}",
                data.state.schema_version
            );
        }

        let final_path = self.file_path(STATE_FILE);
        let tmp_path = final_path.with_extension("json.tmp");
        let bak_path = final_path.with_extension("json.bak");

        let json = serde_json::to_string_pretty(&data.state)?;
        if let Err(e) = (|| -> Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            Ok(())
        })() {
            let _ = fs::remove_file(&tmp_path);
            bail!("Import failed during staging: {e}");
        }

        let had_original = final_path.exists();
        if had_original && let Err(e) = fs::rename(&final_path, &bak_path) {
            let _ = fs::remove_file(&tmp_path);
            bail!("Import failed during commit (backup): {e}");
        }

        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            if had_original {
                let _ = fs::rename(&bak_path, &final_path);
            }
            let _ = fs::remove_file(&tmp_path);
            bail!("Import failed during commit (rename): {e}");
        }

        if had_original {
            let _ = fs::remove_file(&bak_path);
        }
        Ok(())
    }

    /// Check for a leftover backup from an interrupted import. If the
    /// document itself is missing, the backup is restored; otherwise it is
    /// discarded. Returns true if a backup was found.
    pub fn check_interrupted_import(&self) -> bool {
        let final_path = self.file_path(STATE_FILE);
        let bak_path = final_path.with_extension("json.bak");
        if !bak_path.exists() {
            return false;
        }
        if final_path.exists() {
            let _ = fs::remove_file(&bak_path);
        } else {
            let _ = fs::rename(&bak_path, &final_path);
        }
        true
    }
}

impl Persistence for JsonStore {
    fn persist(&mut self, state: &MapState) -> Result<()> {
        self.save_state(state)
    }
}
