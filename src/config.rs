/// Entry names of the per-book documents; group 1 is the canonical book number.
pub const DEFAULT_ENTRY_PATTERN: &str = r"^(?:.*/)?nwt_([0-9]{2})_\w+_E\.(?:txt|rtf)$";

#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub entry_pattern: String,
    pub jobs: usize,
}

impl SetupConfig {
    pub fn from_env() -> Self {
        let entry_pattern = std::env::var("VERSIFY_ENTRY_PATTERN")
            .unwrap_or_else(|_| DEFAULT_ENTRY_PATTERN.to_owned());
        let jobs = std::env::var("VERSIFY_JOBS")
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|jobs| *jobs > 0)
            .unwrap_or_else(default_jobs);
        Self {
            entry_pattern,
            jobs,
        }
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(mut self, entry_pattern: Option<&str>, jobs: Option<usize>) -> Self {
        if let Some(entry_pattern) = entry_pattern {
            self.entry_pattern = entry_pattern.to_owned();
        }
        if let Some(jobs) = jobs {
            self.jobs = jobs.max(1);
        }
        self
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}
