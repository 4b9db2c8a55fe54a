use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_yellow};

/// Progress tracking for the three-phase job-run export
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_phase_1() -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let pb = create_spinner(bright_yellow("Phase 1/3: Fetching projects").to_string());
        Self { pb }
    }

    pub fn finish_phase_1_start_phase_2(self, project_count: usize) -> Self {
        self.pb.finish_with_message(
            bright_green(format!("Phase 1/3: Fetched {project_count} projects ✓")).to_string(),
        );
        let pb = create_spinner(bright_yellow("Phase 2/3: Fetching jobs and runs").to_string());
        Self { pb }
    }

    /// Shows which project is being enumerated.
    pub fn set_project(&self, index: usize, total: usize, name: &str) {
        self.pb.set_message(
            bright_yellow(format!("Phase 2/3: Fetching jobs and runs ({index}/{total}: {name})"))
                .to_string(),
        );
    }

    pub fn finish_phase_2_start_phase_3(self, run_count: usize) -> Self {
        self.pb.finish_with_message(
            bright_green(format!("Phase 2/3: Fetched {run_count} job runs ✓")).to_string(),
        );
        let pb = create_spinner(bright_yellow("Phase 3/3: Writing CSV").to_string());
        Self { pb }
    }

    pub fn finish_phase_3(self) {
        self.pb
            .finish_with_message(bright_green("Phase 3/3: CSV written ✓").to_string());
        eprintln!();
    }
}

/// Spinner shown while the resource totals are collected.
pub fn resources_spinner() -> ProgressBar {
    create_spinner(bright_yellow("Aggregating resources across projects").to_string())
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
