//! Length table: per-record byte lengths
//! 长度表：每条记录的字节长度

use log::warn;

use crate::{Error, Result, Translator, default::TERMINATOR, index::Entry};

#[inline]
fn to_u32(offset: u64, len: u64) -> Result<u32> {
  u32::try_from(len).map_err(|_| Error::TooLarge { offset, len })
}

/// Fill lengths from offset gaps.
/// A record ends one byte (its terminator) before the next larger offset,
/// the last one before `size`. Entries sharing an offset get the same length.
/// With `data` mapped, a record whose end byte is not a terminator keeps it.
/// 由偏移间隔推导长度。记录结束于下一个更大偏移之前一字节（结束符），
/// 最后一条结束于 `size` 之前。共享偏移的条目长度相同。
/// 映射了 `data` 时，结束字节不是结束符的记录保留该字节。
pub fn gaps<K>(entries: &mut [Entry<K>], size: u64, data: Option<&[u8]>) -> Result<()> {
  let mut order: Vec<usize> = (0..entries.len()).collect();
  order.sort_by_key(|&i| entries[i].offset);

  if let Some(&i) = order.last()
    && entries[i].offset > size
  {
    return Err(Error::OutOfData {
      offset: entries[i].offset,
      len: 0,
      size,
    });
  }

  let mut bound = size;
  let mut last = None;
  let mut unterminated = 0usize;
  for &i in order.iter().rev() {
    let offset = entries[i].offset;
    if last != Some(offset) {
      if let Some(l) = last {
        bound = l;
      }
      last = Some(offset);
    }
    let mut len = bound - offset;
    if len > 0 {
      let terminated = match data {
        Some(data) => usize::try_from(bound - 1)
          .ok()
          .and_then(|p| data.get(p))
          .is_some_and(|&b| b == TERMINATOR),
        None => true,
      };
      if terminated {
        len -= 1;
      } else {
        unterminated += 1;
      }
    }
    entries[i].len = to_u32(offset, len)?;
  }
  if unterminated > 0 {
    warn!("{unterminated} records end without terminator");
  }
  Ok(())
}

/// Check every record lies inside `size` bytes, return the largest end offset
/// 检查每条记录都在 `size` 字节内，返回最大结束偏移
pub fn check<K>(entries: &[Entry<K>], size: u64) -> Result<u64> {
  let mut end = 0;
  for e in entries {
    if e.end() > size {
      return Err(Error::OutOfData {
        offset: e.offset,
        len: e.len as u64,
        size,
      });
    }
    end = end.max(e.end());
  }
  Ok(end)
}

/// Largest end offset over all records
/// 所有记录的最大结束偏移
#[inline]
pub fn end<K>(entries: &[Entry<K>]) -> u64 {
  entries.iter().map(Entry::end).max().unwrap_or(0)
}

/// Length table in physical order
/// 按物理顺序排列的长度表
pub fn physical<K>(entries: &[Entry<K>], tr: Option<&Translator>) -> Box<[u32]> {
  match tr {
    Some(tr) => (0..entries.len())
      .map(|pos| entries[tr.to_canonical(pos)].len)
      .collect(),
    None => entries.iter().map(|e| e.len).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entries(offsets: &[u64]) -> Vec<Entry<u32>> {
    offsets
      .iter()
      .enumerate()
      .map(|(i, &offset)| Entry {
        key: i as u32,
        offset,
        len: 0,
      })
      .collect()
  }

  fn lens(entries: &[Entry<u32>]) -> Vec<u32> {
    entries.iter().map(|e| e.len).collect()
  }

  #[test]
  fn test_gaps_mapped() {
    let data = b"ABCDEFGHI\0ABCDEFGHIJ\0ABCDEFGH\0";
    let mut li = entries(&[0, 10, 21]);
    gaps(&mut li, data.len() as u64, Some(data)).unwrap();
    assert_eq!(lens(&li), [9, 10, 8]);
    assert_eq!(check(&li, data.len() as u64).unwrap(), 29);
  }

  #[test]
  fn test_gaps_internal_nul() {
    let data = b"ab\0cd\0xyz\0";
    let mut mapped = entries(&[0, 6]);
    gaps(&mut mapped, data.len() as u64, Some(data)).unwrap();
    let mut derived = entries(&[0, 6]);
    gaps(&mut derived, data.len() as u64, None).unwrap();
    assert_eq!(lens(&mapped), [5, 3]);
    assert_eq!(lens(&mapped), lens(&derived));
  }

  #[test]
  fn test_gaps_unterminated() {
    let mut li = entries(&[0, 4]);
    gaps(&mut li, 8, Some(b"abc\0tail")).unwrap();
    assert_eq!(lens(&li), [3, 4]);
  }

  #[test]
  fn test_gaps_out_of_data() {
    let mut li = entries(&[0, 40]);
    assert!(matches!(
      gaps(&mut li, 4, Some(b"abc\0")),
      Err(Error::OutOfData { offset: 40, .. })
    ));
  }

  #[test]
  fn test_gaps() {
    // File order is not offset order, one offset shared
    // 文件顺序不是偏移顺序，且有共享偏移
    let mut li = entries(&[21, 0, 10, 10]);
    gaps(&mut li, 30, None).unwrap();
    assert_eq!(lens(&li), [8, 9, 10, 10]);
  }

  #[test]
  fn test_check() {
    let mut li = entries(&[0, 10]);
    li[1].len = 30;
    assert!(matches!(
      check(&li, 30),
      Err(Error::OutOfData {
        offset: 10,
        len: 30,
        size: 30
      })
    ));
    assert_eq!(end(&li), 40);
  }

  #[test]
  fn test_physical() {
    let mut li = entries(&[0, 10, 21]);
    for (e, len) in li.iter_mut().zip([9, 10, 8]) {
      e.len = len;
    }
    let tr = Translator::from_order(vec![1, 0, 2]);
    assert_eq!(&*physical(&li, Some(&tr)), &[10, 9, 8]);
    assert_eq!(&*physical(&li, None), &[9, 10, 8]);
  }
}
