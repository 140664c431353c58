//! Consumer side: drain the work queue into the output file, one record per line, optionally
//! through a streaming brotli compressor.

use anyhow::Result;
use brotli::CompressorWriter;
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::progress::WriteProgress;
use crate::error::DumpError;
use crate::utils::config::{BrotliConsts, WRITE_BUFFER_SIZE};
use crate::{Compression, Record};

use super::queue::QueueReceiver;

const NEWLINE: &[u8] = b"\n";

/// File → buffer, with the compressor on top when enabled.
enum SinkStream {
    Plain(BufWriter<File>),
    Brotli(Box<CompressorWriter<LatchedWriter<BufWriter<File>>>>),
}

impl Write for SinkStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkStream::Plain(w) => w.write(buf),
            SinkStream::Brotli(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            SinkStream::Plain(w) => w.write_all(buf),
            SinkStream::Brotli(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkStream::Plain(w) => w.flush(),
            SinkStream::Brotli(w) => w.flush(),
        }
    }
}

impl SinkStream {
    /// Finish the compressor (if any), then flush the buffer. Returns the file for syncing.
    fn close(self) -> io::Result<File> {
        let buffered = match self {
            SinkStream::Plain(w) => w,
            SinkStream::Brotli(mut w) => {
                w.flush()?;
                // The compressor writes its final block here and drops any error; the latch keeps it.
                (*w).into_inner().into_inner()?
            }
        };
        buffered.into_inner().map_err(|e| e.into_error())
    }
}

/// Remembers the first write error so it survives a layer above that discards it.
pub struct LatchedWriter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> LatchedWriter<W> {
    pub fn new(inner: W) -> Self {
        LatchedWriter { inner, error: None }
    }

    /// The wrapped writer, or the first error any write or flush hit.
    pub fn into_inner(self) -> io::Result<W> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.inner),
        }
    }

    fn latch<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        if let Err(e) = &result
            && e.kind() != io::ErrorKind::Interrupted
            && self.error.is_none()
        {
            self.error = Some(io::Error::new(e.kind(), e.to_string()));
        }
        result
    }
}

impl<W: Write> Write for LatchedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.inner.write(buf);
        self.latch(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.inner.flush();
        self.latch(result)
    }
}

/// Output file opened for exclusive creation.
pub struct SinkWriter {
    stream: SinkStream,
    path: PathBuf,
    written: u64,
}

impl SinkWriter {
    /// Create `path`, failing if anything already exists there.
    pub fn create(path: &Path, compression: Compression) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    DumpError::OutputExists(path.to_path_buf())
                } else {
                    DumpError::io(format!("create output file {}", path.display()), e)
                }
            })?;
        let buffered = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let stream = match compression {
            Compression::None => SinkStream::Plain(buffered),
            Compression::Brotli { quality } => SinkStream::Brotli(Box::new(CompressorWriter::new(
                LatchedWriter::new(buffered),
                BrotliConsts::BUFFER_SIZE,
                quality,
                BrotliConsts::LG_WINDOW,
            ))),
        };
        debug!(
            "Opened {} for writing ({:?})",
            path.display(),
            compression
        );
        Ok(SinkWriter {
            stream,
            path: path.to_path_buf(),
            written: 0,
        })
    }

    /// Records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write `record` followed by a newline.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.stream
            .write_all(record.as_bytes())
            .and_then(|_| self.stream.write_all(NEWLINE))
            .map_err(|e| DumpError::io(format!("write to {}", self.path.display()), e))?;
        self.written += 1;
        Ok(())
    }

    /// Finish compressor, flush buffer, sync file. Returns the number of records written.
    pub fn finish(self) -> Result<u64> {
        let context = format!("close output file {}", self.path.display());
        let file = self
            .stream
            .close()
            .map_err(|e| DumpError::io(context.clone(), e))?;
        file.sync_all().map_err(|e| DumpError::io(context, e))?;
        debug!("Closed {} after {} records", self.path.display(), self.written);
        Ok(self.written)
    }

    /// Write every record from `queue` until it is closed and drained, then [`finish`](Self::finish).
    pub fn drain(mut self, queue: QueueReceiver, mut progress: Option<WriteProgress>) -> Result<u64> {
        while let Some(record) = queue.pop() {
            self.write_record(&record)?;
            if let Some(p) = progress.as_mut() {
                p.record_written();
            }
        }
        debug!("Consumer done");
        if let Some(p) = progress {
            p.finish();
        }
        self.finish()
    }
}

/// Run the sink writer on its own thread.
pub fn spawn_sink_writer(
    sink: SinkWriter,
    queue: QueueReceiver,
    progress: Option<WriteProgress>,
) -> JoinHandle<Result<u64>> {
    thread::spawn(move || sink.drain(queue, progress))
}
