use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::processing::FilterCounts;

/// Filter stage that left a batch with no surviving rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Presence,
    Duplicate,
    Completeness,
    BlankName,
    AllZero,
}

/// Events emitted by the pipeline driver.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    RunStarted,
    BatchRead { batch_index: u64, rows: usize },
    BatchSkipped { batch_index: u64, stage: FilterStage },
    BatchWritten {
        batch_index: u64,
        rows: usize,
        total_written: u64,
    },
    RunFinished { elapsed: Duration, stats: RunStats },
    RunFailed { message: String },
}

/// Observer hook for pipeline events.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub batches_read: u64,
    pub batches_written: u64,
    pub rows_read: u64,
    /// Rows the source skipped as unreadable.
    pub malformed_rows: u64,
    pub rows_written: u64,
    pub rejected: FilterCounts,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows_read={}, rows_written={}, batches={}/{}, malformed={}, missing_name={}, duplicate={}, incomplete={}, blank_name={}, all_zero={}",
            self.rows_read,
            self.rows_written,
            self.batches_written,
            self.batches_read,
            self.malformed_rows,
            self.rejected.missing_name,
            self.rejected.duplicate,
            self.rejected.incomplete,
            self.rejected.blank_name,
            self.rejected.all_zero
        )
    }
}

/// Prints progress to stderr: a running total after each written batch and a completion line.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::BatchWritten { total_written, .. } => eprintln!("Processed {total_written}"),
            PipelineEvent::RunFinished { elapsed, stats } => {
                eprintln!("Completed Processing! ({stats}, elapsed={elapsed:?})")
            }
            PipelineEvent::RunFailed { message } => eprintln!("[pipeline][failed] {message}"),
            _ => {}
        }
    }
}

/// Appends every event to a local log file, one timestamped line each.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_event(&self, event: &PipelineEvent) {
        let line = match event {
            PipelineEvent::RunStarted => "run started".to_string(),
            PipelineEvent::BatchRead { batch_index, rows } => format!("batch={batch_index} read rows={rows}"),
            PipelineEvent::BatchSkipped { batch_index, stage } => {
                format!("batch={batch_index} skipped emptied_by={stage:?}")
            }
            PipelineEvent::BatchWritten {
                batch_index,
                rows,
                total_written,
            } => format!("batch={batch_index} written rows={rows} total={total_written}"),
            PipelineEvent::RunFinished { elapsed, stats } => format!("run finished elapsed={elapsed:?} {stats}"),
            PipelineEvent::RunFailed { message } => format!("run failed err={message}"),
        };
        self.append_line(&format!("{} {line}", unix_ts()));
    }
}

/// Fans events out to several observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_event(&self, event: &PipelineEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        seen: Mutex<usize>,
    }

    impl PipelineObserver for Counting {
        fn on_event(&self, _event: &PipelineEvent) {
            *self.seen.lock().unwrap() += 1;
        }
    }

    #[test]
    fn composite_forwards_to_every_observer() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let composite = CompositeObserver::new(vec![a.clone(), b.clone()]);

        composite.on_event(&PipelineEvent::RunStarted);
        composite.on_event(&PipelineEvent::RunFailed {
            message: "boom".to_string(),
        });

        assert_eq!(*a.seen.lock().unwrap(), 2);
        assert_eq!(*b.seen.lock().unwrap(), 2);
        assert_eq!(format!("{composite:?}"), "CompositeObserver { observers_len: 2 }");
    }

    #[test]
    fn file_observer_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.log");
        let obs = FileObserver::new(&path);

        obs.on_event(&PipelineEvent::RunStarted);
        obs.on_event(&PipelineEvent::BatchWritten {
            batch_index: 0,
            rows: 3,
            total_written: 3,
        });

        let log = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("run started"));
        assert!(lines[1].ends_with("batch=0 written rows=3 total=3"));
    }

    #[test]
    fn stats_display_lists_rejections() {
        let stats = RunStats {
            rows_read: 10,
            rows_written: 4,
            rejected: FilterCounts {
                duplicate: 6,
                ..Default::default()
            },
            ..Default::default()
        };
        let s = stats.to_string();
        assert!(s.contains("rows_read=10"));
        assert!(s.contains("rows_written=4"));
        assert!(s.contains("duplicate=6"));
    }
}
