mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::export_job_runs;
pub use progress::{resources_spinner, PhaseProgress};
pub use styling::{dim, magenta_bold};
pub use summary::{print_export_summary, print_resource_summary, render_resource_json};

/// Prints the `cmlreport` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📈 cmlreport"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Cloudera Machine Learning reporting tool")
    );
}
