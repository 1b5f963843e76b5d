// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fs::File,
          io::{ErrorKind, Read, Write},
          path::Path,
          sync::Arc};

use crate::{BufferDataType, EditBuffer, EditBufferError, EditBufferResult, byte_index,
            byte_len};

pub const RAW_DATA_TYPE_NAME: &str = "raw";

/// Bytes in, bytes out. No header, no metadata, no transcoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawDataType;

impl BufferDataType for RawDataType {
    fn name(&self) -> &'static str { RAW_DATA_TYPE_NAME }

    /// Streams `reader` in chunks of [`crate::BufferConfig::io_chunk_size`] bytes. Only
    /// one chunk is held in memory at a time.
    fn load(&self, buffer: &mut EditBuffer, reader: &mut dyn Read) -> EditBufferResult<()> {
        let mut chunk = vec![0_u8; buffer.config().io_chunk_size];
        let mut offset = buffer.total_size().end_index();
        let mut nb_chunks = 0_usize;

        loop {
            let len = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(len) => len,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::warn!(
                        message = "raw load failed, keeping partial content",
                        buffer = %buffer.name(),
                        loaded_up_to = %offset,
                        error = %err,
                    );
                    return Err(EditBufferError::io("read the next chunk", err));
                }
            };
            buffer.insert(offset, &chunk[..len])?;
            offset = offset + byte_len(len);
            nb_chunks += 1;
        }

        tracing::debug!(
            message = "raw load",
            buffer = %buffer.name(),
            total_size = %buffer.total_size(),
            nb_chunks,
        );
        Ok(())
    }

    /// Files of at least [`crate::BufferConfig::shared_load_threshold`] bytes are read
    /// in one go into a shared backing store, and inserted as read only pages. Pages
    /// are copied only when they get edited. Smaller files go through [`Self::load`].
    fn load_file(&self, buffer: &mut EditBuffer, path: &Path) -> EditBufferResult<()> {
        let metadata = std::fs::metadata(path)
            .map_err(|err| EditBufferError::io(format!("stat {}", path.display()), err))?;
        let threshold = buffer.config().shared_load_threshold;

        if usize::try_from(metadata.len()).is_ok_and(|len| len >= threshold) {
            let backing: Arc<[u8]> = std::fs::read(path)
                .map_err(|err| EditBufferError::io(format!("read {}", path.display()), err))?
                .into();
            tracing::debug!(
                message = "raw shared load",
                buffer = %buffer.name(),
                path = %path.display(),
                size = backing.len(),
            );
            let end = buffer.total_size().end_index();
            return buffer.insert_shared(end, backing);
        }

        let mut file = File::open(path)
            .map_err(|err| EditBufferError::io(format!("open {}", path.display()), err))?;
        self.load(buffer, &mut file)
    }

    /// Streams the buffer out in chunks of [`crate::BufferConfig::io_chunk_size`] bytes.
    fn save(&self, buffer: &EditBuffer, path: &Path) -> EditBufferResult<()> {
        let context = || format!("write {}", path.display());
        let mut file =
            File::create(path).map_err(|err| EditBufferError::io(context(), err))?;

        let total_size = buffer.total_size().as_usize();
        let mut chunk = vec![0_u8; buffer.config().io_chunk_size.min(total_size)];
        let mut offset = 0;
        while offset < total_size {
            let len = chunk.len().min(total_size - offset);
            buffer.read_into(byte_index(offset), &mut chunk[..len])?;
            file.write_all(&chunk[..len])
                .map_err(|err| EditBufferError::io(context(), err))?;
            offset += len;
        }
        file.flush().map_err(|err| EditBufferError::io(context(), err))?;

        tracing::debug!(
            message = "raw save",
            buffer = %buffer.name(),
            path = %path.display(),
            size = total_size,
        );
        Ok(())
    }
}
