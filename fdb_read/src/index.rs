//! Index store: `key\toffset[\tlen]` lines parsed into entries
//! 索引存储：将 `key\toffset[\tlen]` 行解析为条目

use std::path::Path;

use log::warn;

use crate::{Error, Key, Result, default::SEP, key::num};

/// One index entry, `len` excludes the NUL terminator
/// 索引条目，`len` 不含 NUL 结束符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<K> {
  pub key: K,
  pub offset: u64,
  pub len: u32,
}

impl<K> Entry<K> {
  /// End offset of the record bytes
  /// 记录字节的结束偏移
  #[inline]
  pub fn end(&self) -> u64 {
    self.offset + self.len as u64
  }
}

/// Parsed index in file order
/// 按文件顺序解析的索引
#[derive(Debug)]
pub struct Parsed<K> {
  pub entries: Vec<Entry<K>>,
  /// Lengths came from the file
  /// 长度来自文件
  pub has_len: bool,
  /// File order is already ascending by key
  /// 文件顺序已按键升序
  pub key_sorted: bool,
}

impl<K> Parsed<K> {
  pub fn empty() -> Self {
    Self {
      entries: Vec::new(),
      has_len: true,
      key_sorted: true,
    }
  }
}

/// Count index lines (a last line without `\n` counts) to pre-size the entry vector
/// 统计索引行数（末行无 `\n` 也计入），用于预分配条目数组
pub fn count_line(buf: &[u8]) -> usize {
  let n = memchr::memchr_iter(b'\n', buf).count();
  match buf.last() {
    None | Some(&b'\n') => n,
    Some(_) => n + 1,
  }
}

pub fn load<K: Key>(path: &Path) -> Result<Parsed<K>> {
  let buf = std::fs::read(path)?;
  parse(&buf)
}

pub fn parse<K: Key>(buf: &[u8]) -> Result<Parsed<K>> {
  let mut entries: Vec<Entry<K>> = Vec::with_capacity(count_line(buf));
  let mut has_len = None;
  let mut key_sorted = true;

  let body = buf.strip_suffix(b"\n").unwrap_or(buf);
  if body.is_empty() {
    return Ok(Parsed::empty());
  }

  for (no, line) in body.split(|&b| b == b'\n').enumerate() {
    let line_no = no + 1;
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    let mut field: [&[u8]; 3] = [&b""[..]; 3];
    let mut n = 0;
    for f in line.split(|&b| b == SEP) {
      if n == field.len() {
        return Err(Error::format(line_no, "more than 3 fields"));
      }
      field[n] = f;
      n += 1;
    }
    if n < 2 {
      return Err(Error::format(line_no, format!("expect 2 or 3 fields, got {n}")));
    }

    let key = K::parse(field[0]).ok_or_else(|| Error::format(line_no, "invalid key"))?;
    let offset: u64 = num(field[1]).ok_or_else(|| Error::format(line_no, "invalid offset"))?;
    let len: u32 = if n == 3 {
      num(field[2]).ok_or_else(|| Error::format(line_no, "invalid length"))?
    } else {
      0
    };

    let with_len = n == 3;
    match has_len {
      None => has_len = Some(with_len),
      Some(h) if h != with_len => {
        return Err(Error::format(line_no, "lines mix 2 and 3 fields"));
      }
      Some(_) => {}
    }

    if let Some(last) = entries.last()
      && last.key > key
    {
      key_sorted = false;
    }
    entries.push(Entry { key, offset, len });
  }

  Ok(Parsed {
    entries,
    has_len: has_len.unwrap_or(true),
    key_sorted,
  })
}

/// Lower-bound binary search, then exact match
/// 下界二分查找，再精确匹配
#[inline]
pub fn bsearch<K: Key>(entries: &[Entry<K>], key: K) -> Option<usize> {
  let i = entries.partition_point(|e| e.key < key);
  (i < entries.len() && entries[i].key == key).then_some(i)
}

/// Stable sort by key, logging duplicate keys
/// 按键稳定排序，记录重复键
pub fn sort_by_key<K: Key>(entries: &mut [Entry<K>]) {
  entries.sort_by_key(|e| e.key);
  let dup = entries.windows(2).filter(|w| w[0].key == w[1].key).count();
  if dup > 0 {
    warn!("{dup} duplicate keys in index, lookup returns one of them");
  }
}
