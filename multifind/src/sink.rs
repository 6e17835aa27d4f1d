//! Serialized reporting of matches from concurrently running workers.
//!
//! Every worker shares one sink. A sink must write each match as a single
//! complete line no matter how many workers emit at the same time.
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::errors::SearchResult;
use crate::results::NameMatch;

/// Destination for matches produced by search workers
pub trait ResultSink: Send + Sync {
    /// Reports one match as one atomic unit of output
    fn emit(&self, result: &NameMatch) -> SearchResult<()>;
}

/// Writes `"<worker>: <wanted>: <path>\n"` lines to a shared writer.
///
/// Each line is formatted and written with one call while holding the lock,
/// so lines from different workers never interleave. Paths are written as
/// raw bytes, never through a lossy UTF-8 conversion.
#[derive(Debug)]
pub struct LineSink<W> {
    writer: Mutex<W>,
}

impl LineSink<io::Stdout> {
    /// A sink writing to the process's standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> ResultSink for LineSink<W> {
    fn emit(&self, result: &NameMatch) -> SearchResult<()> {
        // One write_all per lock; a poisoned lock still holds whole lines
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&result.to_line())?;
        writer.flush()?;
        Ok(())
    }
}

/// Keeps matches in memory, for callers that want them as values
#[derive(Debug, Default)]
pub struct CollectingSink {
    matches: Mutex<Vec<NameMatch>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the sink and returns the matches in emission order
    pub fn into_matches(self) -> Vec<NameMatch> {
        self.matches
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultSink for CollectingSink {
    fn emit(&self, result: &NameMatch) -> SearchResult<()> {
        self.matches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::WorkerId;
    use std::path::PathBuf;
    use std::thread;

    fn sample(worker: WorkerId, n: usize) -> NameMatch {
        NameMatch {
            worker,
            wanted: format!("file_{}.txt", n).into(),
            path: PathBuf::from(format!("/root/dir/with/a/long/path/file_{}.txt", n)),
        }
    }

    #[test]
    fn test_line_format() {
        let sink = LineSink::new(Vec::new());
        let m = sample(WorkerId::next(), 7);
        sink.emit(&m).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            format!("{}: file_7.txt: /root/dir/with/a/long/path/file_7.txt\n", m.worker)
        );
    }

    #[test]
    fn test_concurrent_emitters_do_not_interleave() {
        let sink = LineSink::new(Vec::new());

        thread::scope(|scope| {
            for n in 0..50 {
                let sink = &sink;
                scope.spawn(move || {
                    let worker = WorkerId::next();
                    sink.emit(&sample(worker, n)).unwrap();
                });
            }
        });

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.ends_with('\n'));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 50);

        let mut seen: Vec<usize> = lines
            .iter()
            .map(|line| {
                let parts: Vec<&str> = line.splitn(3, ": ").collect();
                assert_eq!(parts.len(), 3, "garbled line: {}", line);
                assert!(parts[0].parse::<u64>().is_ok());
                let n: usize = parts[1]
                    .trim_start_matches("file_")
                    .trim_end_matches(".txt")
                    .parse()
                    .unwrap();
                assert_eq!(
                    parts[2],
                    format!("/root/dir/with/a/long/path/file_{}.txt", n)
                );
                n
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[cfg(unix)]
    #[test]
    fn test_line_sink_writes_raw_path_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let sink = LineSink::new(Vec::new());
        let m = NameMatch {
            worker: WorkerId::next(),
            wanted: "a.txt".into(),
            path: PathBuf::from(OsStr::from_bytes(b"/tmp/d\xff/a.txt")),
        };
        sink.emit(&m).unwrap();

        let mut expected = format!("{}: a.txt: ", m.worker).into_bytes();
        expected.extend_from_slice(b"/tmp/d\xff/a.txt\n");
        assert_eq!(sink.into_inner(), expected);
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        let worker = WorkerId::next();
        sink.emit(&sample(worker, 1)).unwrap();
        sink.emit(&sample(worker, 2)).unwrap();

        let matches = sink.into_matches();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].wanted, "file_1.txt");
        assert_eq!(matches[1].wanted, "file_2.txt");
    }
}
