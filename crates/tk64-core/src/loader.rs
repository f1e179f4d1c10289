//! Program image loading.
//!
//! An image is a flat sequence of little-endian 4-byte instruction words
//! copied verbatim into memory at the configured load base.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::memory::{ImageRegion, INSTRUCTION_BYTES};
use crate::{CoreConfig, Machine};

/// Load-time failures. Reported before any instruction executes.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("failed to read image {}: {source}", .path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The image does not fit between the load base and the end of memory.
    #[error("image of {len} bytes does not fit in {available} bytes above the load base")]
    TooLarge {
        /// Image length in bytes.
        len: usize,
        /// Bytes available from the load base to the end of memory.
        available: usize,
    },
    /// The image length is not a whole number of instruction words.
    #[error("image length {len} is not a multiple of 4 (truncated final instruction)")]
    TruncatedWord {
        /// Image length in bytes.
        len: usize,
    },
    /// The configured load base is unusable.
    #[error(
        "load base {base:#x} is not a 4-byte aligned address inside {capacity} bytes of memory"
    )]
    InvalidLoadBase {
        /// Configured load base.
        base: u64,
        /// Configured memory capacity.
        capacity: usize,
    },
}

/// Creates a machine from `config` and copies `image` to the load base.
///
/// # Errors
///
/// Returns a [`LoadError`] when the load base is invalid, the image is not a
/// whole number of words, or the image does not fit in memory.
pub fn load_image(image: &[u8], config: &CoreConfig) -> Result<Machine, LoadError> {
    let invalid_base = || LoadError::InvalidLoadBase {
        base: config.load_base,
        capacity: config.memory_bytes,
    };
    let base = usize::try_from(config.load_base).map_err(|_| invalid_base())?;
    if base > config.memory_bytes || config.load_base % INSTRUCTION_BYTES != 0 {
        return Err(invalid_base());
    }

    if image.len() % 4 != 0 {
        return Err(LoadError::TruncatedWord { len: image.len() });
    }

    let available = config.memory_bytes - base;
    if image.len() > available {
        return Err(LoadError::TooLarge {
            len: image.len(),
            available,
        });
    }

    let mut machine = Machine::with_config(config);
    machine.memory[base..base + image.len()].copy_from_slice(image);
    machine.image = ImageRegion::new(config.load_base, image.len() as u64);

    tracing::debug!(
        base = format_args!("{:#x}", config.load_base),
        bytes = image.len(),
        words = image.len() / 4,
        "loaded program image"
    );

    Ok(machine)
}

/// Reads the image at `path` and loads it with [`load_image`].
///
/// # Errors
///
/// Returns [`LoadError::Read`] when the file cannot be read, otherwise the
/// errors of [`load_image`].
pub fn load_image_file(path: &Path, config: &CoreConfig) -> Result<Machine, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_image(&bytes, config)
}
