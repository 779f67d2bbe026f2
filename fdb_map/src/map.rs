//! Memory mapping of a data file
//! 数据文件内存映射
//!
//! The mapped bytes are shared read-only by every reader thread. A remap drops
//! the old region before mapping the file again, so callers must not hold
//! slices across it (enforced by `&mut self`).
//! 映射区域被所有读线程只读共享。重映射先释放旧区域再重新映射，
//! 调用者不能跨重映射持有切片（由 `&mut self` 保证）。

use std::{
  fs::{File, OpenOptions},
  path::{Path, PathBuf},
};

#[cfg(unix)]
use memmap2::Advice;
use memmap2::{Mmap, MmapMut};

use crate::{Codec, Error, Result, dec};

/// Map options
/// 映射选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapConf {
  /// Map read-write
  /// 读写映射
  pub writable: bool,
  /// Codec of the whole file
  /// 整个文件的压缩算法
  pub codec: Codec,
}

enum Region {
  Ro(Mmap),
  Rw(MmapMut),
  /// Decoded compressed file
  /// 解压后的文件内容
  Owned(Box<[u8]>),
}

impl Region {
  #[inline]
  fn as_slice(&self) -> &[u8] {
    match self {
      Self::Ro(m) => &m[..],
      Self::Rw(m) => &m[..],
      Self::Owned(b) => &b[..],
    }
  }
}

/// Mapped data file, the file handle lives as long as the mapping
/// 已映射的数据文件，文件句柄与映射同生命周期
pub struct Map {
  path: PathBuf,
  conf: MapConf,
  file: File,
  region: Region,
}

impl Map {
  pub fn open(path: impl Into<PathBuf>, conf: MapConf) -> Result<Self> {
    if conf.writable && !conf.codec.is_none() {
      return Err(Error::WritableCompressed);
    }
    let path = path.into();
    let (file, region) = map(&path, conf)?;
    let map = Self {
      path,
      conf,
      file,
      region,
    };
    // A compressed frame may decode to nothing
    // 压缩帧可能解码为空
    if map.is_empty() {
      return Err(Error::Empty(map.path));
    }
    Ok(map)
  }

  /// Unmap, then map the same path again (file may have grown or been rewritten)
  /// 解除映射后重新映射同一路径（文件可能已增长或被重写）
  pub fn remap(self) -> Result<Self> {
    let Self {
      path,
      conf,
      file,
      region,
    } = self;
    drop(region);
    drop(file);
    Self::open(path, conf)
  }

  #[inline]
  pub fn as_slice(&self) -> &[u8] {
    self.region.as_slice()
  }

  /// Mutable bytes, writable maps only
  /// 可变字节，仅可写映射
  #[inline]
  pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
    match &mut self.region {
      Region::Rw(m) => Some(&mut m[..]),
      _ => None,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.as_slice().len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[inline]
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Size of the file on disk (compressed size for compressed stores)
  /// 磁盘上的文件大小（压缩存储为压缩后大小）
  pub fn file_len(&self) -> Result<u64> {
    Ok(self.file.metadata()?.len())
  }

  /// Flush writes back to the file, no-op for read-only maps
  /// 刷写回文件，只读映射无操作
  pub fn flush(&self) -> Result<()> {
    if let Region::Rw(m) = &self.region {
      m.flush()?;
    }
    Ok(())
  }

  /// Ask the OS to page the whole region in ahead of a linear scan
  /// 在线性扫描前请求系统预读整个区域
  pub fn advise_willneed(&self) -> Result<()> {
    match &self.region {
      Region::Owned(_) => {}
      #[cfg(unix)]
      Region::Ro(m) => m.advise(Advice::WillNeed)?,
      #[cfg(unix)]
      Region::Rw(m) => m.advise(Advice::WillNeed)?,
      #[cfg(not(unix))]
      _ => touch(self.as_slice()),
    }
    Ok(())
  }
}

fn map(path: &Path, conf: MapConf) -> Result<(File, Region)> {
  let file = OpenOptions::new()
    .read(true)
    .write(conf.writable)
    .open(path)?;
  let len = file.metadata()?.len();
  if len == 0 {
    return Err(Error::Empty(path.into()));
  }

  // SAFETY: the store is immutable while mapped; external writers only append
  // and the owner remaps before reading the new bytes
  // 映射期间存储不可变；外部写入只追加，所有者在读取新数据前重映射
  let region = if conf.writable {
    Region::Rw(unsafe { MmapMut::map_mut(&file)? })
  } else {
    let mmap = unsafe { Mmap::map(&file)? };
    match conf.codec {
      Codec::None => Region::Ro(mmap),
      codec => Region::Owned(dec(codec, &mmap)?.into_boxed_slice()),
    }
  };

  log::debug!(
    "map {} {len} bytes -> {} ({:?})",
    path.display(),
    region.as_slice().len(),
    conf
  );
  Ok((file, region))
}

#[cfg(not(unix))]
fn touch(buf: &[u8]) {
  const PAGE: usize = 4096;
  let mut sum = 0u8;
  for b in buf.iter().step_by(PAGE) {
    sum = sum.wrapping_add(*b);
  }
  std::hint::black_box(sum);
}
