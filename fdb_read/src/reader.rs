//! Reader over a (data, index) file pair
//! (数据, 索引) 文件对的读取器
//!
//! Lifecycle: `new` -> `open(sort)` -> concurrent `&self` reads -> `close`.
//! Everything built by `open` is immutable until `close`, the only `&mut self`
//! operations in between are `remap_data`, `unmap_data` and `raw_data_mut`.
//! 生命周期：`new` -> `open(sort)` -> 并发 `&self` 读 -> `close`。
//! `open` 构建的一切在 `close` 之前不可变，其间只有 `remap_data`、
//! `unmap_data`、`raw_data_mut` 需要 `&mut self`。

use std::path::{Path, PathBuf};

use fdb_map::Map;
use log::{debug, info, warn};

use crate::{
  Conf, Config, Error, Key, Result, Sort, Translator,
  index::{self, Entry, Parsed},
  lens,
};

/// One record yielded by iteration, `data` is None when data is not mapped
/// 迭代产出的一条记录，未映射数据时 `data` 为 None
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<'a, K> {
  pub pos: usize,
  pub key: K,
  pub data: Option<&'a [u8]>,
}

/// State built by `open`
/// `open` 构建的状态
pub(crate) struct Opened<K> {
  sort: Sort,
  /// Canonical entries, key-sorted unless `Sort::NoSort`
  /// 规范条目，除 `Sort::NoSort` 外按键有序
  entries: Box<[Entry<K>]>,
  /// None when physical order equals canonical order
  /// 物理顺序与规范顺序相同时为 None
  tr: Option<Translator>,
  /// Lengths in physical order
  /// 按物理顺序的长度
  lens: Box<[u32]>,
  /// Canonical entries can be binary searched
  /// 规范条目可二分查找
  searchable: bool,
  /// Largest record end, the data file must be at least this long
  /// 最大记录结束偏移，数据文件至少这么长
  data_end: u64,
  map: Option<Map>,
}

impl<K: Key> Opened<K> {
  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  #[inline(always)]
  fn at(&self, pos: usize) -> &Entry<K> {
    let id = match &self.tr {
      Some(tr) => tr.to_canonical(pos),
      None => pos,
    };
    &self.entries[id]
  }

  #[inline]
  fn entry(&self, pos: usize) -> Result<&Entry<K>> {
    let size = self.len();
    if pos >= size {
      return Err(Error::OutOfRange { pos, size });
    }
    Ok(self.at(pos))
  }

  fn id(&self, key: K) -> Result<Option<usize>> {
    if !self.searchable {
      return Err(Error::Unsorted);
    }
    Ok(index::bsearch(&self.entries, key).map(|id| match &self.tr {
      Some(tr) => tr.to_local(id),
      None => id,
    }))
  }

  #[inline]
  fn record(&self, e: &Entry<K>) -> Option<&[u8]> {
    let map = self.map.as_ref()?;
    let start = usize::try_from(e.offset).ok()?;
    map.as_slice().get(start..start + e.len as usize)
  }

  /// `pos` must be `< len()`
  /// `pos` 必须 `< len()`
  #[inline]
  pub(crate) fn item(&self, pos: usize) -> Item<'_, K> {
    let e = self.at(pos);
    Item {
      pos,
      key: e.key,
      data: self.record(e),
    }
  }
}

/// Indexed reader, `Send + Sync` once open
/// 索引读取器，打开后 `Send + Sync`
pub struct Reader<K = u32> {
  data_path: PathBuf,
  index_path: PathBuf,
  config: Config,
  opened: Option<Opened<K>>,
}

impl<K: Key> Reader<K> {
  pub fn new(
    data_path: impl Into<PathBuf>,
    index_path: impl Into<PathBuf>,
    conf: &[Conf],
  ) -> Result<Self> {
    let config = Config::from(conf);
    config.mode.check(config.codec)?;
    Ok(Self {
      data_path: data_path.into(),
      index_path: index_path.into(),
      config,
      opened: None,
    })
  }

  /// Load index, map data, derive lengths and apply `sort`.
  /// A failed open leaves the reader closed.
  /// 加载索引、映射数据、推导长度并应用 `sort`。打开失败时读取器保持关闭。
  pub fn open(&mut self, sort: Sort) -> Result<()> {
    if self.opened.is_some() {
      return Err(Error::AlreadyOpen);
    }
    let mode = self.config.mode;

    let Parsed {
      mut entries,
      has_len,
      key_sorted,
    } = if mode.index {
      index::load::<K>(&self.index_path)?
    } else {
      Parsed::empty()
    };

    let map = if mode.data {
      match Map::open(&self.data_path, self.config.map_conf()) {
        Ok(map) => Some(map),
        // Empty store: nothing to address
        // 空存储：无可寻址内容
        Err(fdb_map::Error::Empty(_)) if entries.is_empty() => None,
        Err(e) => return Err(e.into()),
      }
    } else {
      None
    };

    let data_end = match &map {
      Some(map) => {
        let size = map.len() as u64;
        if !has_len {
          lens::gaps(&mut entries, size, Some(map.as_slice()))?;
        }
        lens::check(&entries, size)?
      }
      None => {
        if !has_len && !entries.is_empty() {
          let size = match self.stored_size()? {
            Some(size) => size,
            None => lens::end(&entries),
          };
          lens::gaps(&mut entries, size, None)?;
        }
        lens::end(&entries)
      }
    };

    let searchable = if sort.sorts_key() {
      if !key_sorted {
        index::sort_by_key(&mut entries);
      }
      true
    } else {
      key_sorted
    };

    let tr = sort.order(&entries).map(Translator::from_order);
    let lens = lens::physical(&entries, tr.as_ref());

    if self.config.prefetch
      && let Some(map) = &map
    {
      map.advise_willneed()?;
    }

    info!(
      "open {}: {} entries, {sort:?}, data {}",
      self.index_path.display(),
      entries.len(),
      map.as_ref().map_or(0, Map::len)
    );

    self.opened = Some(Opened {
      sort,
      entries: entries.into_boxed_slice(),
      tr,
      lens,
      searchable,
      data_end,
      map,
    });
    Ok(())
  }

  /// Size of the stored records when data is not mapped.
  /// Compressed stores are decoded once to learn it. None for a missing plain file.
  /// 未映射数据时存储记录的大小。压缩存储解码一次以获得大小。普通文件缺失时为 None。
  fn stored_size(&self) -> Result<Option<u64>> {
    if !self.config.codec.is_none() {
      let map = Map::open(&self.data_path, self.config.map_conf())?;
      debug!(
        "decode {} for lengths: {} bytes",
        self.data_path.display(),
        map.len()
      );
      return Ok(Some(map.len() as u64));
    }
    match std::fs::metadata(&self.data_path) {
      Ok(meta) => Ok(Some(meta.len())),
      Err(e) => {
        warn!("stat {}: {e}", self.data_path.display());
        Ok(None)
      }
    }
  }

  /// Release mapping and tables
  /// 释放映射与表
  pub fn close(&mut self) -> Result<()> {
    let opened = self.opened.take().ok_or(Error::Closed)?;
    info!(
      "close {}: {} entries",
      self.index_path.display(),
      opened.len()
    );
    Ok(())
  }

  #[inline]
  pub fn is_open(&self) -> bool {
    self.opened.is_some()
  }

  #[inline]
  pub(crate) fn state(&self) -> Result<&Opened<K>> {
    self.opened.as_ref().ok_or(Error::Closed)
  }

  #[inline]
  pub fn data_path(&self) -> &Path {
    &self.data_path
  }

  #[inline]
  pub fn index_path(&self) -> &Path {
    &self.index_path
  }

  #[inline]
  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn sort(&self) -> Result<Sort> {
    Ok(self.state()?.sort)
  }

  /// Number of records
  /// 记录数
  pub fn size(&self) -> Result<usize> {
    Ok(self.state()?.len())
  }

  /// Key at physical position
  /// 物理位置上的键
  pub fn db_key(&self, pos: usize) -> Result<K> {
    Ok(self.state()?.entry(pos)?.key)
  }

  /// Physical position of `key`, `Ok(None)` when absent
  /// `key` 的物理位置，不存在时为 `Ok(None)`
  pub fn id(&self, key: K) -> Result<Option<usize>> {
    self.state()?.id(key)
  }

  /// Record bytes at physical position, without terminator.
  /// `Ok(None)` when data is not mapped.
  /// 物理位置上的记录字节，不含结束符。未映射数据时为 `Ok(None)`。
  pub fn data(&self, pos: usize) -> Result<Option<&[u8]>> {
    let s = self.state()?;
    Ok(s.record(s.entry(pos)?))
  }

  /// `data(id(key))`, `Ok(None)` when the key is absent
  /// `data(id(key))`，键不存在时为 `Ok(None)`
  pub fn data_by_key(&self, key: K) -> Result<Option<&[u8]>> {
    let s = self.state()?;
    match s.id(key)? {
      Some(pos) => Ok(s.record(s.entry(pos)?)),
      None => Ok(None),
    }
  }

  /// Byte offset of the record at physical position
  /// 物理位置上记录的字节偏移
  pub fn data_offset(&self, pos: usize) -> Result<u64> {
    Ok(self.state()?.entry(pos)?.offset)
  }

  /// Length table in physical order
  /// 按物理顺序的长度表
  pub fn seq_lens(&self) -> Result<&[u32]> {
    Ok(&self.state()?.lens[..])
  }

  pub fn seq_len(&self, pos: usize) -> Result<u32> {
    let lens = &self.state()?.lens;
    lens.get(pos).copied().ok_or(Error::OutOfRange {
      pos,
      size: lens.len(),
    })
  }

  /// Sum of all record lengths
  /// 所有记录长度之和
  pub fn total_len(&self) -> Result<u64> {
    Ok(self.state()?.lens.iter().map(|&l| l as u64).sum())
  }

  /// Canonical entries (key order unless opened with `Sort::NoSort`)
  /// 规范条目（除 `Sort::NoSort` 外为键顺序）
  pub fn entries(&self) -> Result<&[Entry<K>]> {
    Ok(&self.state()?.entries[..])
  }

  /// Mapped data size, 0 when not mapped
  /// 映射数据大小，未映射时为 0
  pub fn data_size(&self) -> Result<usize> {
    Ok(self.state()?.map.as_ref().map_or(0, Map::len))
  }

  /// Whole mapped region
  /// 整个映射区域
  pub fn raw_data(&self) -> Result<Option<&[u8]>> {
    Ok(self.state()?.map.as_ref().map(Map::as_slice))
  }

  /// Whole mapped region, writable mode only
  /// 整个映射区域，仅可写模式
  pub fn raw_data_mut(&mut self) -> Result<Option<&mut [u8]>> {
    let s = self.opened.as_mut().ok_or(Error::Closed)?;
    Ok(s.map.as_mut().and_then(Map::as_mut_slice))
  }

  /// Flush writable mapping
  /// 刷写可写映射
  pub fn flush(&self) -> Result<()> {
    if let Some(map) = &self.state()?.map {
      map.flush()?;
    }
    Ok(())
  }

  /// Page the data in ahead of a full scan
  /// 全量扫描前预读数据
  pub fn prefetch(&self) -> Result<()> {
    if let Some(map) = &self.state()?.map {
      map.advise_willneed()?;
    }
    Ok(())
  }

  /// Records in physical order
  /// 按物理顺序的记录
  pub fn iter(&self) -> Result<impl ExactSizeIterator<Item = Item<'_, K>> + '_> {
    let s = self.state()?;
    Ok((0..s.len()).map(move |pos| s.item(pos)))
  }

  /// Drop the mapping, `data*` return `Ok(None)` until `remap_data`
  /// 释放映射，`remap_data` 之前 `data*` 返回 `Ok(None)`
  pub fn unmap_data(&mut self) -> Result<()> {
    let s = self.opened.as_mut().ok_or(Error::Closed)?;
    s.map = None;
    Ok(())
  }

  /// Unmap and map the data file again, e.g. after an external append.
  /// On any error the reader stays open with data unmapped: the file may be
  /// gone or unreadable, or shorter than the index needs (`Error::Truncated`).
  /// A later `remap_data` maps it again from scratch.
  /// 解除并重新映射数据文件，如外部追加之后。
  /// 任何错误下读取器保持打开但数据未映射：文件可能已删除、不可读，
  /// 或短于索引所需（`Error::Truncated`）。之后的 `remap_data` 会重新映射。
  pub fn remap_data(&mut self) -> Result<()> {
    if !self.config.mode.data {
      self.state()?;
      return Ok(());
    }
    let conf = self.config.map_conf();
    let s = self.opened.as_mut().ok_or(Error::Closed)?;

    let map = match s.map.take() {
      Some(map) => map.remap()?,
      None => Map::open(&self.data_path, conf)?,
    };
    let size = map.len() as u64;
    if size < s.data_end {
      warn!(
        "remap {}: {size} bytes, index needs {}",
        self.data_path.display(),
        s.data_end
      );
      return Err(Error::Truncated {
        need: s.data_end,
        size,
      });
    }
    debug!("remap {}: {size} bytes", self.data_path.display());
    s.map = Some(map);
    Ok(())
  }
}
