//! Byte streams handed to a unit.
//!
//! A stream handle is shared: the unit writes through its clone while the run's [`ResourceTracker`] keeps another
//! so finalization can close it whether or not the unit ever does. Once closed, a handle refuses further I/O.
//!
//! [`ResourceTracker`]: crate::tracker::ResourceTracker

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use harness_core::{StreamRole, artifacts};
use parking_lot::Mutex;

use crate::error::{HarnessError, HarnessResult};
use crate::run::context::RunContext;
use crate::tracker::TrackedHandle;

fn closed_error(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, format!("stream '{name}' is closed"))
}

struct WriteState {
    name: String,
    path: PathBuf,
    role: StreamRole,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl TrackedHandle for WriteState {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&self) -> io::Result<()> {
        match self.writer.lock().take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.writer.lock().is_none()
    }
}

/// Output or work-in-progress stream created through [`WriteStreamManager`].
#[derive(Clone)]
pub struct WriteStream {
    state: Arc<WriteState>,
}

impl WriteStream {
    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn path(&self) -> &Path {
        &self.state.path
    }

    pub fn role(&self) -> StreamRole {
        self.state.role
    }

    /// Flush and close. Closing twice is fine.
    pub fn close(&self) -> io::Result<()> {
        self.state.close()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }
}

impl Write for WriteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.state.writer.lock().as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(closed_error(&self.state.name)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.state.writer.lock().as_mut() {
            Some(writer) => writer.flush(),
            None => Err(closed_error(&self.state.name)),
        }
    }
}

struct ReadState {
    name: String,
    path: PathBuf,
    reader: Mutex<Option<BufReader<File>>>,
}

impl TrackedHandle for ReadState {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&self) -> io::Result<()> {
        self.reader.lock().take();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.reader.lock().is_none()
    }
}

/// Read-only stream over a file.
#[derive(Clone)]
pub struct ReadStream {
    state: Arc<ReadState>,
}

impl ReadStream {
    pub(crate) fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            state: Arc::new(ReadState {
                name,
                path: path.to_path_buf(),
                reader: Mutex::new(Some(BufReader::new(file))),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn path(&self) -> &Path {
        &self.state.path
    }

    pub fn close(&self) {
        self.state.reader.lock().take();
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Whether two handles refer to the same underlying stream.
    pub fn same_stream(&self, other: &ReadStream) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn tracked(&self) -> Arc<dyn TrackedHandle> {
        self.state.clone()
    }
}

impl Read for ReadStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.state.reader.lock().as_mut() {
            Some(reader) => reader.read(buf),
            None => Err(closed_error(&self.state.name)),
        }
    }
}

/// Creates the unit's output and work-in-progress streams.
#[derive(Clone)]
pub struct WriteStreamManager {
    ctx: Arc<RunContext>,
}

impl WriteStreamManager {
    pub(crate) fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Create (truncating) `name` in the directory selected by `role` and register it for closure.
    ///
    /// `role` is a tag: `"wip"` selects the working directory, anything else the output directory. Names that
    /// collide with a harness artifact, in any case, are refused and nothing is registered.
    pub fn get_write_stream(&self, name: &str, role: &str) -> HarnessResult<WriteStream> {
        if artifacts::is_reserved_name(name) {
            return Err(HarnessError::ReservedName { name: name.to_string() });
        }
        require_plain_name(name)?;
        if self.ctx.is_closed() {
            return Err(HarnessError::RunFinalized);
        }

        let role = StreamRole::from_tag(role);
        if role == StreamRole::FinalOutput {
            let requested = self.ctx.note_output_stream();
            if requested > 1 {
                tracing::debug!(requested, name, "more than one output stream requested");
            }
        }

        let path = self.ctx.dirs.for_role(role).join(name);
        let file = File::create(&path).map_err(|e| HarnessError::io(format!("creating {}", path.display()), e))?;
        let state = Arc::new(WriteState {
            name: name.to_string(),
            path,
            role,
            writer: Mutex::new(Some(BufWriter::new(file))),
        });
        self.ctx.tracker.register(state.clone());

        Ok(WriteStream { state })
    }

    /// Open a stream over a file previously written in the directory selected by `role`.
    pub fn get_read_stream(&self, name: &str, role: &str) -> HarnessResult<ReadStream> {
        require_plain_name(name)?;
        let path = self.ctx.dirs.for_role(StreamRole::from_tag(role)).join(name);
        ReadStream::open(&path).map_err(|e| HarnessError::io(format!("opening {}", path.display()), e))
    }
}

/// Stream names are single file names; anything that could resolve outside the role directory is refused.
fn require_plain_name(name: &str) -> HarnessResult<()> {
    if artifacts::is_plain_file_name(name) {
        Ok(())
    } else {
        Err(HarnessError::InvalidStreamName { name: name.to_string() })
    }
}
