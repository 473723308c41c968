//! File-backed memory region (std only).

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};

use super::region::{check_bounds, MemoryRegion};
use super::stream::PacketStream;

fn io_error(e: std::io::Error) -> TransportError {
    let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
    TransportError::Io(msg)
}

#[allow(unsafe_code)]
fn map_file(file: &File, size: usize) -> std::io::Result<MmapMut> {
    // Other processes may write the mapping concurrently; every access goes
    // through `read`/`write` copies ordered by the packet stream fences.
    unsafe { MmapOptions::new().len(size).map_mut(file) }
}

/// Named file mapped into memory, typically under `/dev/shm`.
#[derive(Debug)]
pub struct FileRegion {
    path: PathBuf,
    size: usize,
    map: Option<MmapMut>,
}

impl FileRegion {
    /// Closed region of `size` bytes backed by the file at `path`.
    pub fn new<P: AsRef<Path>>(path: P, size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            size,
            map: None,
        }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mapping(&self) -> core::result::Result<&MmapMut, TransportError> {
        self.map.as_ref().ok_or(TransportError::NotOpen)
    }
}

impl MemoryRegion for FileRegion {
    fn open(&mut self, initialize: bool) -> core::result::Result<(), TransportError> {
        if self.map.is_some() {
            return Err(TransportError::AlreadyOpen);
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(initialize)
            .open(&self.path)
            .map_err(io_error)?;

        if initialize {
            file.set_len(self.size as u64).map_err(io_error)?;
        } else {
            let len = file.metadata().map_err(io_error)?.len() as usize;
            if len < self.size {
                return Err(TransportError::RegionTooSmall {
                    size: len,
                    minimum: self.size,
                });
            }
        }

        let mut map = map_file(&file, self.size).map_err(io_error)?;
        if initialize {
            map.fill(0);
        }
        log::info!("opened region {} ({} bytes)", self.path.display(), self.size);
        self.map = Some(map);
        Ok(())
    }

    fn close(&mut self) -> core::result::Result<(), TransportError> {
        let map = self.map.take().ok_or(TransportError::NotOpen)?;
        map.flush().map_err(io_error)?;
        log::info!("closed region {}", self.path.display());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.map.is_some()
    }

    fn size(&self) -> usize {
        self.size
    }

    fn read(&self, offset: usize, out: &mut [u8]) -> core::result::Result<(), TransportError> {
        let map = self.mapping()?;
        check_bounds(map.len(), offset, out.len())?;
        out.copy_from_slice(&map[offset..offset + out.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> core::result::Result<(), TransportError> {
        let map = self.map.as_mut().ok_or(TransportError::NotOpen)?;
        check_bounds(map.len(), offset, bytes.len())?;
        map[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

/// Open the commands and answers streams named by `config`.
///
/// With `initialize`, the backing files are created and zeroed; otherwise
/// they must already exist.
pub fn open_streams(
    config: &TransportConfig,
    initialize: bool,
) -> Result<(PacketStream<FileRegion>, PacketStream<FileRegion>)> {
    let mut commands = FileRegion::new(config.commands_region.as_str(), config.region_size);
    let mut answers = FileRegion::new(config.answers_region.as_str(), config.region_size);
    commands.open(initialize)?;
    answers.open(initialize)?;
    Ok((PacketStream::new(commands)?, PacketStream::new(answers)?))
}
