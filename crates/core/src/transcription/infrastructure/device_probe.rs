use std::process::Command;

/// Returns true if CUDA-capable acceleration appears to be present.
///
/// whisper.cpp decides at build time whether GPU offload is compiled in, so
/// the best a front end can do is probe for the driver tooling. The
/// `VOXSCRIBE_FORCE_GPU` variable overrides the probe (`1` forces on,
/// anything else forces off), which also keeps CI deterministic.
pub fn accelerated_available() -> bool {
    if let Ok(value) = std::env::var("VOXSCRIBE_FORCE_GPU") {
        return value == "1";
    }
    Command::new("nvidia-smi")
        .arg("-L")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}
