//! Preset persistence.
//!
//! A preset is the value of every registered parameter, written as
//! whitespace-separated decimal floats in registry order to `preset<N>.txt`,
//! with `N` in 1..=9. Loading requires the field count to exactly match the
//! registry; a missing file, a parse failure or a count mismatch leaves the
//! current parameters untouched.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::params::{ParamKey, Params};

fn preset_path(dir: &Path, index: u8) -> PathBuf {
    dir.join(format!("preset{index}.txt"))
}

/// Save all registered parameters to `preset<index>.txt` under `dir`.
pub fn save(dir: &Path, params: &Params, index: u8) {
    let text = ParamKey::ALL
        .iter()
        .map(|key| params.get(*key).to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let path = preset_path(dir, index);
    match fs::write(&path, text) {
        Ok(()) => info!(path = %path.display(), "preset saved"),
        Err(e) => warn!(path = %path.display(), error = %e, "preset save failed"),
    }
}

/// Load `preset<index>.txt` from `dir` into the parameter store.
///
/// Returns `true` if the preset was applied. Any failure keeps the prior
/// values and returns `false`.
pub fn load(dir: &Path, params: &mut Params, index: u8) -> bool {
    let path = preset_path(dir, index);
    let Ok(text) = fs::read_to_string(&path) else {
        debug!(path = %path.display(), "preset not found");
        return false;
    };

    let values: Result<Vec<f32>, _> = text.split_whitespace().map(str::parse).collect();
    let Ok(values) = values else {
        debug!(path = %path.display(), "preset has unparsable fields");
        return false;
    };
    if values.len() != ParamKey::ALL.len() {
        debug!(
            path = %path.display(),
            fields = values.len(),
            expected = ParamKey::ALL.len(),
            "preset field count mismatch"
        );
        return false;
    }

    for (key, value) in ParamKey::ALL.iter().zip(values) {
        params.set(*key, value);
    }
    info!(path = %path.display(), "preset loaded");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("emberfield-presets-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_round_trip_reproduces_every_value() {
        let dir = scratch_dir("roundtrip");
        let mut params = Params::default();
        params.force = -123.5;
        params.history = 0.73;
        params.shape = 1.0;
        save(&dir, &params, 3);

        let mut loaded = Params::default();
        assert!(load(&dir, &mut loaded, 3));
        for key in ParamKey::ALL {
            assert_eq!(loaded.get(key), params.get(key), "{}", key.name());
        }
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_keeps_prior_values() {
        let dir = scratch_dir("missing");
        let mut params = Params::default();
        let before = params.clone();
        assert!(!load(&dir, &mut params, 7));
        assert_eq!(params, before);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_field_count_mismatch_is_ignored() {
        let dir = scratch_dir("mismatch");
        fs::write(preset_path(&dir, 1), "1 2 3").unwrap();
        let mut params = Params::default();
        let before = params.clone();
        assert!(!load(&dir, &mut params, 1));
        assert_eq!(params, before);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_garbage_content_is_ignored() {
        let dir = scratch_dir("garbage");
        fs::write(preset_path(&dir, 2), "not a preset at all").unwrap();
        let mut params = Params::default();
        let before = params.clone();
        assert!(!load(&dir, &mut params, 2));
        assert_eq!(params, before);
        fs::remove_dir_all(&dir).ok();
    }
}
