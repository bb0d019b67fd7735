//! Single-file storage backend.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tickvault_common::{Record, FILE_HEADER_SIZE};
use tracing::{debug, info, trace};

use super::header::FileHeader;
use super::options::OpenOptions;
use crate::backend::{check_range, StorageBackend};
use crate::error::{StorageError, StorageResult};

/// A storage backend keeping one dataset in one file.
///
/// The file handle sits behind a mutex so that reads take `&self`. The header
/// is rewritten after every mutation, so the file is self-consistent between
/// calls; `flush` additionally syncs file data when configured.
pub struct FileBackend<R> {
    /// The underlying file; `None` once closed.
    file: Option<Mutex<File>>,
    /// The file path.
    path: PathBuf,
    /// In-memory copy of the on-disk header.
    header: FileHeader,
    /// Options the file was opened with.
    options: OpenOptions,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> FileBackend<R> {
    /// Opens a dataset file with the specified options.
    ///
    /// A new or empty file (or any file when `truncate` is set) is
    /// initialized with an empty header. An existing file must carry a valid
    /// header for `R` and be exactly as long as its header says.
    pub fn open(path: impl AsRef<Path>, options: OpenOptions) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = options
            .to_std_options()
            .open(&path)
            .map_err(|e| StorageError::from_io_with_path(e, &path))?;
        let file_len = file.metadata()?.len();

        let mut backend = Self {
            file: Some(Mutex::new(file)),
            path,
            header: FileHeader::for_record::<R>(),
            options,
            _marker: PhantomData,
        };

        if file_len == 0 || (backend.options.truncate && !backend.options.read_only) {
            if backend.options.read_only {
                return Err(StorageError::corrupted(&backend.path, "empty dataset file"));
            }
            backend.initialize()?;
            info!(path = %backend.path.display(), kind = %R::KIND, "created dataset file");
        } else {
            backend.load_header(file_len)?;
            info!(
                path = %backend.path.display(),
                kind = %R::KIND,
                count = backend.header.count,
                read_only = backend.options.read_only,
                "opened dataset file"
            );
        }

        Ok(backend)
    }

    /// Creates (or truncates) a writable dataset file.
    pub fn create(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open(path, OpenOptions::new().create(true).truncate(true))
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current header.
    #[must_use]
    pub fn header(&self) -> FileHeader {
        self.header
    }

    fn initialize(&mut self) -> StorageResult<()> {
        self.header = FileHeader::for_record::<R>();
        let header = self.header.encode();
        let file = self.file_mut()?;
        file.set_len(0)?;
        write_at(file, 0, &header)?;
        Ok(())
    }

    fn load_header(&mut self, file_len: u64) -> StorageResult<()> {
        if file_len < FILE_HEADER_SIZE as u64 {
            return Err(StorageError::corrupted(
                &self.path,
                format!("file is {file_len} bytes, shorter than the header"),
            ));
        }

        let mut bytes = [0u8; FILE_HEADER_SIZE];
        {
            let file = self.file_mut()?;
            read_at(file, 0, &mut bytes)?;
        }
        let header = FileHeader::decode(&bytes, self.options.verify_checksum)?;

        if header.kind != R::KIND {
            return Err(StorageError::KindMismatch {
                expected: R::KIND,
                actual: header.kind,
            });
        }
        if header.record_len as usize != R::ENCODED_LEN {
            return Err(StorageError::corrupted(
                &self.path,
                format!(
                    "record length {} does not match {} for {}",
                    header.record_len,
                    R::ENCODED_LEN,
                    R::KIND
                ),
            ));
        }
        if header.file_len() != file_len {
            return Err(StorageError::corrupted(
                &self.path,
                format!(
                    "file is {file_len} bytes but header describes {} records ({} bytes)",
                    header.count,
                    header.file_len()
                ),
            ));
        }

        self.header = header;
        Ok(())
    }

    fn file_mut(&mut self) -> StorageResult<&mut File> {
        self.file
            .as_mut()
            .map(|file| file.get_mut())
            .ok_or(StorageError::Closed)
    }

    fn writable_file(&mut self) -> StorageResult<&mut File> {
        if self.file.is_none() {
            return Err(StorageError::Closed);
        }
        if self.options.read_only {
            return Err(StorageError::ReadOnly);
        }
        self.file_mut()
    }

    fn store_header(&mut self) -> StorageResult<()> {
        let header = self.header.encode();
        write_at(self.file_mut()?, 0, &header)?;
        Ok(())
    }

    #[inline]
    fn position(offset: u64) -> u64 {
        FILE_HEADER_SIZE as u64 + offset * R::ENCODED_LEN as u64
    }

    fn chunk_bytes(&self) -> u64 {
        self.options.chunk_bytes.max(R::ENCODED_LEN) as u64
    }

    fn encode_all(records: &[R]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(records.len() * R::ENCODED_LEN);
        for record in records {
            record.encode(&mut buf);
        }
        buf
    }
}

impl<R: Record> StorageBackend<R> for FileBackend<R> {
    fn len(&self) -> StorageResult<u64> {
        if self.file.is_none() {
            return Err(StorageError::Closed);
        }
        Ok(self.header.count)
    }

    fn read_segment(&self, offset: u64, count: u64) -> StorageResult<Vec<R>> {
        let file = self.file.as_ref().ok_or(StorageError::Closed)?;
        check_range(offset, count, self.header.count)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut bytes = vec![0u8; count as usize * R::ENCODED_LEN];
        {
            let mut file = file.lock();
            read_at(&mut file, Self::position(offset), &mut bytes)?;
        }
        trace!(offset, count, "file read_segment");

        let mut cursor = &bytes[..];
        Ok((0..count).map(|_| R::decode(&mut cursor)).collect())
    }

    fn write_segment(&mut self, offset: u64, records: &[R]) -> StorageResult<()> {
        let len = self.header.count;
        let file = self.writable_file()?;
        check_range(offset, records.len() as u64, len)?;
        if records.is_empty() {
            return Ok(());
        }

        write_at(file, Self::position(offset), &Self::encode_all(records))?;
        trace!(offset, count = records.len(), "file write_segment");
        Ok(())
    }

    fn insert_segment(&mut self, offset: u64, records: &[R]) -> StorageResult<()> {
        let len = self.header.count;
        let chunk = self.chunk_bytes();
        let file = self.writable_file()?;
        if offset > len {
            return Err(StorageError::out_of_bounds(offset, records.len() as u64, len));
        }
        if records.is_empty() {
            return Ok(());
        }

        let added = records.len() as u64;
        let tail_bytes = (len - offset) * R::ENCODED_LEN as u64;
        move_bytes(
            file,
            Self::position(offset),
            tail_bytes,
            Self::position(offset + added),
            chunk,
        )?;
        write_at(file, Self::position(offset), &Self::encode_all(records))?;

        self.header.count += added;
        self.store_header()?;
        trace!(offset, count = added, shifted_bytes = tail_bytes, "file insert_segment");
        Ok(())
    }

    fn delete_segment(&mut self, offset: u64, count: u64) -> StorageResult<()> {
        let len = self.header.count;
        let chunk = self.chunk_bytes();
        let file = self.writable_file()?;
        check_range(offset, count, len)?;
        if count == 0 {
            return Ok(());
        }

        let tail_bytes = (len - offset - count) * R::ENCODED_LEN as u64;
        move_bytes(
            file,
            Self::position(offset + count),
            tail_bytes,
            Self::position(offset),
            chunk,
        )?;
        file.set_len(Self::position(len - count))?;

        self.header.count -= count;
        self.store_header()?;
        trace!(offset, count, shifted_bytes = tail_bytes, "file delete_segment");
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        if self.options.read_only {
            return self.file_mut().map(|_| ());
        }
        self.store_header()?;
        if self.options.sync_on_flush {
            self.file_mut()?.sync_data()?;
        }
        debug!(path = %self.path.display(), count = self.header.count, "flushed dataset file");
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.flush()?;
        self.file = None;
        info!(path = %self.path.display(), "closed dataset file");
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        self.options.read_only
    }
}

impl<R> std::fmt::Debug for FileBackend<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("path", &self.path)
            .field("header", &self.header)
            .field("closed", &self.file.is_none())
            .field("options", &self.options)
            .finish()
    }
}

fn read_at(file: &mut File, pos: u64, buf: &mut [u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(pos))?;
    file.read_exact(buf)
}

fn write_at(file: &mut File, pos: u64, data: &[u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(pos))?;
    file.write_all(data)
}

/// Moves `len` bytes from `src` to `dst`, at most `chunk` bytes per step.
///
/// Overlapping ranges are handled by copying back to front when moving right
/// and front to back when moving left.
fn move_bytes(file: &mut File, src: u64, len: u64, dst: u64, chunk: u64) -> io::Result<()> {
    if len == 0 || src == dst {
        return Ok(());
    }

    let mut buf = vec![0u8; chunk.min(len) as usize];
    if dst > src {
        let mut remaining = len;
        while remaining > 0 {
            let step = remaining.min(chunk);
            remaining -= step;
            let part = &mut buf[..step as usize];
            read_at(file, src + remaining, part)?;
            write_at(file, dst + remaining, part)?;
        }
    } else {
        let mut done = 0;
        while done < len {
            let step = (len - done).min(chunk);
            let part = &mut buf[..step as usize];
            read_at(file, src + done, part)?;
            write_at(file, dst + done, part)?;
            done += step;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tickvault_common::{Quote, Scalar, Trade};

    fn scalars(ticks: &[i64]) -> Vec<Scalar> {
        ticks.iter().map(|&t| Scalar::new(t, t as f64 / 10.0)).collect()
    }

    fn all<R: Record>(backend: &FileBackend<R>) -> Vec<R> {
        let len = backend.len().unwrap();
        backend.read_segment(0, len).unwrap()
    }

    #[test]
    fn test_create_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.tvd");

        let mut backend = FileBackend::<Scalar>::create(&path).unwrap();
        backend.insert_segment(0, &scalars(&[1, 2, 3])).unwrap();
        backend.close().unwrap();

        let backend = FileBackend::<Scalar>::open(&path, OpenOptions::new()).unwrap();
        assert_eq!(backend.len().unwrap(), 3);
        assert_eq!(all(&backend), scalars(&[1, 2, 3]));
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            64 + 3 * Scalar::ENCODED_LEN as u64
        );
    }

    #[test]
    fn test_insert_shifts_tail_in_small_chunks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.tvd");
        let options = OpenOptions::new().create(true).chunk_bytes(1);

        let mut backend = FileBackend::<Scalar>::open(&path, options).unwrap();
        backend.insert_segment(0, &scalars(&[1, 5, 6, 7])).unwrap();
        backend.insert_segment(1, &scalars(&[2, 3, 4])).unwrap();
        assert_eq!(all(&backend), scalars(&[1, 2, 3, 4, 5, 6, 7]));

        backend.insert_segment(7, &scalars(&[8])).unwrap();
        backend.insert_segment(0, &scalars(&[0])).unwrap();
        assert_eq!(all(&backend), scalars(&[0, 1, 2, 3, 4, 5, 6, 7, 8]));
    }

    #[test]
    fn test_delete_and_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.tvd");
        let options = OpenOptions::new().create(true).chunk_bytes(30);

        let mut backend = FileBackend::<Trade>::open(&path, options).unwrap();
        let trades: Vec<Trade> = (0..10).map(|i| Trade::new(i, i as f64, 1.0)).collect();
        backend.insert_segment(0, &trades).unwrap();

        backend.delete_segment(2, 5).unwrap();
        let ticks: Vec<i64> = all(&backend).iter().map(|t| t.ticks).collect();
        assert_eq!(ticks, vec![0, 1, 7, 8, 9]);

        backend.write_segment(2, &[Trade::new(7, 70.0, 2.0)]).unwrap();
        assert_eq!(backend.read_segment(2, 1).unwrap()[0].price, 70.0);

        backend.delete_segment(0, 5).unwrap();
        assert_eq!(backend.len().unwrap(), 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 64);
    }

    #[test]
    fn test_out_of_bounds() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::<Scalar>::create(dir.path().join("s.tvd")).unwrap();
        backend.insert_segment(0, &scalars(&[1, 2])).unwrap();

        assert!(matches!(
            backend.read_segment(1, 2),
            Err(StorageError::OutOfBounds { .. })
        ));
        assert!(backend.insert_segment(3, &scalars(&[9])).is_err());
        assert!(backend.delete_segment(2, 1).is_err());
        assert!(backend.write_segment(2, &scalars(&[9])).is_err());
    }

    #[test]
    fn test_kind_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("q.tvd");
        FileBackend::<Quote>::create(&path).unwrap().close().unwrap();

        let err = FileBackend::<Scalar>::open(&path, OpenOptions::new()).unwrap_err();
        assert!(matches!(err, StorageError::KindMismatch { .. }));
    }

    #[test]
    fn test_length_mismatch_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.tvd");
        let mut backend = FileBackend::<Scalar>::create(&path).unwrap();
        backend.insert_segment(0, &scalars(&[1, 2])).unwrap();
        backend.close().unwrap();

        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(64 + 16 + 3).unwrap();
        drop(file);

        let err = FileBackend::<Scalar>::open(&path, OpenOptions::new()).unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { .. }));
    }

    #[test]
    fn test_read_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.tvd");
        let mut backend = FileBackend::<Scalar>::create(&path).unwrap();
        backend.insert_segment(0, &scalars(&[1])).unwrap();
        backend.close().unwrap();

        let mut backend =
            FileBackend::<Scalar>::open(&path, OpenOptions::new().read_only(true)).unwrap();
        assert!(backend.is_read_only());
        assert_eq!(all(&backend), scalars(&[1]));
        assert!(backend
            .insert_segment(1, &scalars(&[2]))
            .unwrap_err()
            .is_read_only());
        backend.close().unwrap();
        assert!(backend.len().unwrap_err().is_closed());
    }

    #[test]
    fn test_missing_file_without_create() {
        let dir = tempdir().unwrap();
        let err =
            FileBackend::<Scalar>::open(dir.path().join("none.tvd"), OpenOptions::new())
                .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_truncate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.tvd");
        let mut backend = FileBackend::<Scalar>::create(&path).unwrap();
        backend.insert_segment(0, &scalars(&[1, 2, 3])).unwrap();
        backend.close().unwrap();

        let backend = FileBackend::<Scalar>::create(&path).unwrap();
        assert_eq!(backend.len().unwrap(), 0);
    }
}
