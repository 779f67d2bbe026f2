//! Error types for fdb_read
//! fdb_read 错误类型

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("map: {0}")]
  Map(#[from] fdb_map::Error),

  #[error("index line {line}: {msg}")]
  Format { line: usize, msg: Box<str> },

  #[error("record at offset {offset} len {len} exceeds data size {size}")]
  OutOfData { offset: u64, len: u64, size: u64 },

  #[error("record at offset {offset} too large: {len} bytes")]
  TooLarge { offset: u64, len: u64 },

  #[error("reader already open")]
  AlreadyOpen,

  #[error("reader closed")]
  Closed,

  #[error("position {pos} out of range, size {size}")]
  OutOfRange { pos: usize, size: usize },

  #[error("index not sorted by key, open with a key-sorting policy")]
  Unsorted,

  #[error("invalid mode: {0}")]
  InvalidMode(&'static str),

  #[error("data truncated: index needs {need} bytes, file has {size}")]
  Truncated { need: u64, size: u64 },
}

impl Error {
  /// 创建 Format 错误 Create Format error
  #[inline]
  pub fn format(line: usize, msg: impl Into<Box<str>>) -> Self {
    Self::Format {
      line,
      msg: msg.into(),
    }
  }
}
