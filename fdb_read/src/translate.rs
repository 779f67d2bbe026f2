//! Position translator between canonical and physical order
//! 规范顺序与物理顺序之间的位置转换
//!
//! The canonical array is key-sorted and serves binary search. A reordering
//! sort only permutes positions: `local2id[physical] = canonical` and its
//! inverse `id2local[canonical] = physical`.
//! 规范数组按键有序用于二分查找。重排序只置换位置：
//! `local2id[物理] = 规范`，其逆为 `id2local[规范] = 物理`。

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translator {
  local2id: Box<[usize]>,
  id2local: Box<[usize]>,
}

impl Translator {
  /// Build from physical order, `O(n)`; `local2id` must be a permutation of `0..n`
  /// 由物理顺序构建，`O(n)`；`local2id` 必须是 `0..n` 的一个排列
  pub fn from_order(local2id: Vec<usize>) -> Self {
    let mut id2local = vec![0; local2id.len()];
    for (local, &id) in local2id.iter().enumerate() {
      id2local[id] = local;
    }
    Self {
      local2id: local2id.into_boxed_slice(),
      id2local: id2local.into_boxed_slice(),
    }
  }

  /// Canonical position to physical position
  /// 规范位置转物理位置
  #[inline(always)]
  pub fn to_local(&self, id: usize) -> usize {
    self.id2local[id]
  }

  /// Physical position to canonical position
  /// 物理位置转规范位置
  #[inline(always)]
  pub fn to_canonical(&self, local: usize) -> usize {
    self.local2id[local]
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.local2id.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.local2id.is_empty()
  }
}
