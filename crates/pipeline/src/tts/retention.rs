//! Age-based removal of synthesized audio files

use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::PipelineError;

/// Every file the synthesizer writes is named `speech_*.mp3`
pub(crate) const SPEECH_FILE_PREFIX: &str = "speech_";
pub(crate) const SPEECH_FILE_SUFFIX: &str = ".mp3";

fn is_speech_file(name: &str) -> bool {
    name.starts_with(SPEECH_FILE_PREFIX) && name.ends_with(SPEECH_FILE_SUFFIX)
}

/// Delete speech files in `dir` last modified at least `max_age` ago.
///
/// Other files are left alone. A missing directory sweeps nothing.
/// Returns the number of files removed.
pub async fn sweep_expired_audio(dir: &Path, max_age: Duration) -> Result<usize, PipelineError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !is_speech_file(name) {
            continue;
        }

        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }

        // Files stamped in the future count as brand new
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "Failed to remove expired audio");
            }
        }
    }

    Ok(removed)
}
