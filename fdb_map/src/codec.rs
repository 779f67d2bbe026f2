//! Whole-file codec for compressed stores
//! 压缩存储的整文件编解码

use crate::{Error, Result};

/// zstd level used by `enc`
/// `enc` 使用的 zstd 压缩级别
pub const ZSTD_LEVEL: i32 = 3;

/// 压缩算法 Compression codec
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Codec {
  #[default]
  None = 0,
  /// Size-prepended lz4 block
  /// 带长度前缀的 lz4 块
  Lz4 = 1,
  Zstd = 2,
}

impl Codec {
  #[inline]
  pub fn is_none(self) -> bool {
    self == Self::None
  }
}

/// 压缩 Compress a whole data file, as a writer of compressed stores does
pub fn enc(codec: Codec, src: &[u8]) -> Result<Vec<u8>> {
  match codec {
    Codec::None => Ok(src.to_vec()),
    Codec::Lz4 => Ok(lz4_flex::compress_prepend_size(src)),
    Codec::Zstd => zstd::encode_all(src, ZSTD_LEVEL).map_err(Error::Zstd),
  }
}

/// 解压 Decompress
pub fn dec(codec: Codec, src: &[u8]) -> Result<Vec<u8>> {
  match codec {
    Codec::None => Ok(src.to_vec()),
    Codec::Lz4 => Ok(lz4_flex::decompress_size_prepended(src)?),
    Codec::Zstd => zstd::decode_all(src).map_err(Error::Zstd),
  }
}
