use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::shared::constants::AUDIO_EXTENSIONS;

use super::transcribe_file_use_case::PipelineError;

/// Per-file pipeline invoked by the batch runner.
pub type FilePipeline<'a> = dyn Fn(&Path) -> Result<PathBuf, PipelineError> + 'a;

/// Accumulated batch results: outputs for successful files, errors keyed by
/// the failing input path.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub outputs: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, String)>,
}

/// Returns true for files on the case-insensitive audio extension allow-list.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Drive the per-file pipeline over every eligible file in `dir`
/// (non-recursive).
///
/// The cancellation flag is checked before each file, never mid-file. A
/// failing file is recorded and the batch continues; an empty directory is a
/// successful empty outcome. Eligible files are processed in name order so
/// runs are deterministic across platforms.
pub fn run(
    dir: &Path,
    pipeline: &FilePipeline,
    is_eligible: &dyn Fn(&Path) -> bool,
    cancelled: &AtomicBool,
    on_file: Option<&dyn Fn(usize, usize, &Path)>,
) -> Result<BatchOutcome, std::io::Error> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_eligible(path))
        .collect();
    files.sort();

    let mut outcome = BatchOutcome::default();
    if files.is_empty() {
        log::info!("No audio files found in {}", dir.display());
        return Ok(outcome);
    }

    let total = files.len();
    log::info!("Found {total} audio files to process");

    for (i, file) in files.iter().enumerate() {
        if cancelled.load(Ordering::Relaxed) {
            log::info!("Batch cancelled after {i} of {total} files");
            break;
        }
        if let Some(cb) = on_file {
            cb(i + 1, total, file);
        }
        match pipeline(file) {
            Ok(output) => outcome.outputs.push(output),
            // A pre-write cancellation checkpoint fired; not a file failure
            Err(PipelineError::Cancelled) => {
                log::info!("Batch cancelled during file {} of {total}", i + 1);
                break;
            }
            Err(e) => {
                log::warn!("Error processing {}: {e}", file.display());
                outcome.errors.push((file.clone(), e.to_string()));
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    fn ok_pipeline(path: &Path) -> Result<PathBuf, PipelineError> {
        Ok(path.with_extension("txt"))
    }

    #[test]
    fn test_is_audio_file_allow_list() {
        assert!(is_audio_file(Path::new("a.mp3")));
        assert!(is_audio_file(Path::new("a.WAV")));
        assert!(is_audio_file(Path::new("a.M4a")));
        assert!(!is_audio_file(Path::new("a.mp4")));
        assert!(!is_audio_file(Path::new("no_extension")));
    }

    #[test]
    fn test_empty_directory_is_successful_empty_outcome() {
        let tmp = TempDir::new().unwrap();
        let cancelled = AtomicBool::new(false);

        let outcome = run(
            tmp.path(),
            &ok_pipeline,
            &is_audio_file,
            &cancelled,
            None,
        )
        .unwrap();
        assert!(outcome.outputs.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_ineligible_files_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.mp3");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "b.OGG");
        let cancelled = AtomicBool::new(false);

        let outcome = run(
            tmp.path(),
            &ok_pipeline,
            &is_audio_file,
            &cancelled,
            None,
        )
        .unwrap();
        assert_eq!(outcome.outputs.len(), 2);
    }

    #[test]
    fn test_files_processed_in_name_order() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "c.wav");
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");
        let cancelled = AtomicBool::new(false);

        let seen = Mutex::new(Vec::new());
        let pipeline = |path: &Path| {
            seen.lock().unwrap().push(path.to_path_buf());
            ok_pipeline(path)
        };

        run(tmp.path(), &pipeline, &is_audio_file, &cancelled, None).unwrap();

        let seen = seen.lock().unwrap();
        let names: Vec<_> = seen
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.wav", "c.wav"]);
    }

    #[test]
    fn test_one_bad_file_does_not_abort_batch() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        let bad = touch(tmp.path(), "b.wav");
        touch(tmp.path(), "c.wav");
        let cancelled = AtomicBool::new(false);

        let pipeline = |path: &Path| {
            if path.file_name().unwrap() == "b.wav" {
                Err(PipelineError::Inference {
                    path: path.to_path_buf(),
                    message: "unreadable".to_string(),
                })
            } else {
                ok_pipeline(path)
            }
        };

        let outcome = run(tmp.path(), &pipeline, &is_audio_file, &cancelled, None).unwrap();
        assert_eq!(outcome.outputs.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].0, bad);
        assert!(outcome.errors[0].1.contains("unreadable"));
    }

    #[test]
    fn test_cancellation_stops_before_next_file() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");
        touch(tmp.path(), "c.wav");
        touch(tmp.path(), "d.wav");
        let cancelled = AtomicBool::new(false);

        // Cancel while the second file is "in flight": it still finishes,
        // files three and four never start.
        let pipeline = |path: &Path| {
            if path.file_name().unwrap() == "b.wav" {
                cancelled.store(true, Ordering::Relaxed);
            }
            ok_pipeline(path)
        };

        let outcome = run(tmp.path(), &pipeline, &is_audio_file, &cancelled, None).unwrap();
        assert_eq!(outcome.outputs.len(), 2);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_cancelled_pipeline_result_stops_without_error_entry() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");
        touch(tmp.path(), "c.wav");
        let cancelled = AtomicBool::new(false);

        // File b hits the pre-write checkpoint: its output is dropped and
        // file c never starts
        let pipeline = |path: &Path| {
            if path.file_name().unwrap() == "b.wav" {
                cancelled.store(true, Ordering::Relaxed);
                Err(PipelineError::Cancelled)
            } else {
                ok_pipeline(path)
            }
        };

        let outcome = run(tmp.path(), &pipeline, &is_audio_file, &cancelled, None).unwrap();
        assert_eq!(outcome.outputs.len(), 1);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_cancellation_before_start_processes_nothing() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        let cancelled = AtomicBool::new(true);

        let outcome = run(
            tmp.path(),
            &ok_pipeline,
            &is_audio_file,
            &cancelled,
            None,
        )
        .unwrap();
        assert!(outcome.outputs.is_empty());
    }

    #[test]
    fn test_on_file_reports_position_and_total() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");
        let cancelled = AtomicBool::new(false);

        let calls = AtomicUsize::new(0);
        let on_file = |current: usize, total: usize, _path: &Path| {
            assert_eq!(total, 2);
            assert_eq!(current, calls.load(Ordering::Relaxed) + 1);
            calls.fetch_add(1, Ordering::Relaxed);
        };

        run(
            tmp.path(),
            &ok_pipeline,
            &is_audio_file,
            &cancelled,
            Some(&on_file),
        )
        .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let cancelled = AtomicBool::new(false);
        let result = run(
            Path::new("/nonexistent/audio"),
            &ok_pipeline,
            &is_audio_file,
            &cancelled,
            None,
        );
        assert!(result.is_err());
    }
}
