use crate::error::{Result, WatchError};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads lines appended to a growing file, starting from its end at open time.
///
/// Never blocks waiting for data: `next_line` returns `Ok(None)` when nothing
/// complete is available and leaves the waiting to the caller.
#[derive(Debug)]
pub struct LineSource {
    path: PathBuf,
    reader: BufReader<File>,
    position: u64,
    pending: Vec<u8>,
}

impl LineSource {
    pub fn open<P: AsRef<Path>>(path: P, buffer_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source| WatchError::ResourceUnavailable {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(unavailable)?;
        let mut reader = BufReader::with_capacity(buffer_size, file);
        let position = reader.seek(SeekFrom::End(0)).map_err(unavailable)?;
        debug!("Tailing {} from offset {}", path.display(), position);

        Ok(Self {
            path,
            reader,
            position,
            pending: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Return the next complete, trimmed line if one has been appended.
    ///
    /// A trailing fragment without a newline is held back until the writer
    /// finishes it. Blank lines are skipped. Bytes that are not valid UTF-8
    /// are replaced rather than failing the read.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            let read = self
                .reader
                .read_until(b'\n', &mut self.pending)
                .map_err(|source| WatchError::ResourceUnavailable {
                    path: self.path.clone(),
                    source,
                })?;

            if read == 0 {
                self.check_truncation()?;
                return Ok(None);
            }
            self.position += read as u64;

            if self.pending.last() != Some(&b'\n') {
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&self.pending).trim().to_string();
            self.pending.clear();
            if !line.is_empty() {
                return Ok(Some(line));
            }
        }
    }

    fn check_truncation(&self) -> Result<()> {
        let len = std::fs::metadata(&self.path)
            .map_err(|source| WatchError::ResourceUnavailable {
                path: self.path.clone(),
                source,
            })?
            .len();

        if len < self.position {
            return Err(WatchError::LogTruncated {
                path: self.path.clone(),
            });
        }
        Ok(())
    }
}
