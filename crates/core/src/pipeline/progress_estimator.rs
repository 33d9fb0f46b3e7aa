use crate::shared::constants::PROGRESS_CEILING;

/// Heuristic progress schedule for an engine that reports no real progress.
///
/// Purely time-driven and uncorrelated with actual work done: large steps
/// early, shrinking later, asymptotic toward the running ceiling. The
/// orchestrator alone snaps progress to 100 on confirmed terminal success.
pub fn next_increment(progress: f64) -> f64 {
    if progress < 20.0 {
        0.5
    } else if progress < 50.0 {
        0.3
    } else if progress < 80.0 {
        0.1
    } else {
        0.05
    }
}

/// One estimator tick: advance and clamp to the running ceiling.
pub fn advance(progress: f64) -> f64 {
    (progress + next_increment(progress)).min(PROGRESS_CEILING)
}
