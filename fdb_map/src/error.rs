//! Error types for fdb_map
//! fdb_map 错误类型

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("empty data file: {}", .0.display())]
  Empty(PathBuf),

  #[error("compressed data cannot be mapped writable")]
  WritableCompressed,

  #[error("lz4: {0}")]
  Lz4(#[from] lz4_flex::block::DecompressError),

  #[error("zstd: {0}")]
  Zstd(std::io::Error),
}
