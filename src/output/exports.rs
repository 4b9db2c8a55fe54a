use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::report::{JobRunRow, JOB_RUN_COLUMNS};

/// Sorts rows by creator username, creation timestamp, project name and job name.
///
/// Every key compares as a plain string, including the timestamp. The sort is
/// stable, so rows with equal keys keep their enumeration order.
pub fn sort_job_runs(rows: &mut [JobRunRow]) {
    rows.sort_by(|a, b| {
        (&a.user_username, &a.created_at, &a.project_name, &a.job_name).cmp(&(
            &b.user_username,
            &b.created_at,
            &b.project_name,
            &b.job_name,
        ))
    });
}

/// Writes the header and one record per row, in the given order.
///
/// The header is written even when there are no rows.
pub fn write_job_runs_csv<W: Write>(rows: &[JobRunRow], output: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(output);

    writer.write_record(JOB_RUN_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Sorts `rows` and writes them to a new CSV file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_job_runs(mut rows: Vec<JobRunRow>, path: &Path) -> Result<usize> {
    sort_job_runs(&mut rows);

    let file = File::create(path)?;
    write_job_runs_csv(&rows, BufWriter::new(file))?;

    info!("Wrote {} job runs to {}", rows.len(), path.display());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(username: &str, created_at: &str, project: &str, job: &str) -> JobRunRow {
        JobRunRow {
            user_username: username.to_string(),
            created_at: created_at.to_string(),
            project_name: project.to_string(),
            job_name: job.to_string(),
            run_id: format!("{username}-{created_at}-{project}-{job}"),
            ..Default::default()
        }
    }

    fn render(rows: &[JobRunRow]) -> String {
        let mut output = Vec::new();
        write_job_runs_csv(rows, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_sort_by_all_four_keys() {
        let mut rows = vec![
            row("bob", "2024-01-01", "P1", "J1"),
            row("alice", "2024-01-02", "P1", "J1"),
            row("alice", "2024-01-01", "P2", "J1"),
            row("alice", "2024-01-01", "P1", "J2"),
            row("alice", "2024-01-01", "P1", "J1"),
        ];

        sort_job_runs(&mut rows);

        let keys: Vec<_> = rows
            .iter()
            .map(|r| {
                (
                    r.user_username.as_str(),
                    r.created_at.as_str(),
                    r.project_name.as_str(),
                    r.job_name.as_str(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                ("alice", "2024-01-01", "P1", "J1"),
                ("alice", "2024-01-01", "P1", "J2"),
                ("alice", "2024-01-01", "P2", "J1"),
                ("alice", "2024-01-02", "P1", "J1"),
                ("bob", "2024-01-01", "P1", "J1"),
            ]
        );
    }

    #[test]
    fn test_sort_is_lexical_and_stable() {
        let mut first = row("", "", "P", "J");
        first.run_id = "first".into();
        let mut second = row("", "", "P", "J");
        second.run_id = "second".into();
        let mut rows = vec![row("Zed", "", "", ""), first, second, row("alice", "", "", "")];

        sort_job_runs(&mut rows);

        // empty usernames first, uppercase before lowercase
        let ids: Vec<_> = rows.iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(ids[0], "first");
        assert_eq!(ids[1], "second");
        assert_eq!(rows[2].user_username, "Zed");
        assert_eq!(rows[3].user_username, "alice");
    }

    #[test]
    fn test_timestamps_compare_as_strings() {
        let mut rows = vec![
            row("u", "2024-01-01T10:00:00+00:00", "P", "J"),
            row("u", "2024-01-01 09:00:00", "P", "J"),
        ];
        sort_job_runs(&mut rows);
        // ' ' sorts before 'T' regardless of the instant each string denotes
        assert_eq!(rows[0].created_at, "2024-01-01 09:00:00");
    }

    #[test]
    fn test_header_only_when_empty() {
        let csv = render(&[]);
        assert_eq!(csv, format!("{}\r\n", JOB_RUN_COLUMNS.join(",")));
    }

    #[test]
    fn test_every_row_has_twenty_fields_with_defaults() {
        let csv = render(&[JobRunRow {
            run_id: "r1".into(),
            ..Default::default()
        }]);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "UserUsername,UserName,UserEmail,ProjectID,ProjectName,JobID,JobName,RunID,Status,\
             CreatedAt,SchedulingAt,StartingAt,RunningAt,FinishedAt,Kernel,CPU,Memory,NvidiaGPU,\
             Arguments,RuntimeIdentifier"
        );
        assert_eq!(lines[1], ",,,,,,,r1,,,,,,,,0,0,0,,");
        assert_eq!(lines[1].split(',').count(), 20);
    }

    #[test]
    fn test_numeric_and_quoted_fields() {
        let csv = render(&[JobRunRow {
            run_id: "r1".into(),
            cpu: Some(1.5),
            memory: Some(4.0),
            nvidia_gpu: 2,
            arguments: "--name \"x\", --fast".into(),
            ..Default::default()
        }]);
        let record = csv.lines().nth(1).unwrap();

        assert!(record.contains(",1.5,4.0,2,"));
        assert!(record.ends_with(",\"--name \"\"x\"\", --fast\","));
    }

    #[test]
    fn test_export_sorts_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_job_runs.csv");
        let rows = vec![
            row("bob", "2024-01-02T00:00:00", "P1", "J1"),
            row("alice", "2024-01-01T00:00:00", "P1", "J1"),
        ];

        let written = export_job_runs(rows, &path).unwrap();

        assert_eq!(written, 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        let users: Vec<_> = contents
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(users, ["alice", "bob"]);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let result = export_job_runs(vec![], &path);
        assert!(matches!(result, Err(crate::error::CmlError::Io(_))));
    }
}
