//! Sort policies applied at open
//! 打开时应用的排序策略

use std::cmp::Reverse;

use crate::index::Entry;

/// Physical order of records
/// 记录的物理顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
  /// File order; key lookup only works if the file is already key-sorted
  /// 文件顺序；仅当文件本身按键有序时可按键查找
  NoSort,

  /// Ascending key
  /// 按键升序
  #[default]
  ByKey,

  /// Longest record first, equal lengths keep ascending key order.
  /// Front-loads heavy work items for parallel workers.
  /// 最长记录在前，长度相同保持键升序。让并行任务先处理重的条目。
  ByLength,

  /// Ascending offset, equal offsets keep ascending key order.
  /// Sequential disk order for full scans.
  /// 按偏移升序，偏移相同保持键升序。全量扫描时顺序读盘。
  LinearAccess,
}

impl Sort {
  /// Whether open sorts the canonical array by key
  /// 打开时是否按键排序规范数组
  #[inline]
  pub fn sorts_key(self) -> bool {
    !matches!(self, Self::NoSort)
  }

  /// Physical order as canonical positions, None when it equals canonical order
  /// 以规范位置表示的物理顺序，与规范顺序相同时返回 None
  pub fn order<K>(self, entries: &[Entry<K>]) -> Option<Vec<usize>> {
    if matches!(self, Self::NoSort | Self::ByKey) {
      return None;
    }
    let mut order: Vec<usize> = (0..entries.len()).collect();
    match self {
      Self::ByLength => order.sort_by_key(|&i| Reverse(entries[i].len)),
      Self::LinearAccess => order.sort_by_key(|&i| entries[i].offset),
      Self::NoSort | Self::ByKey => {}
    }
    Some(order)
  }
}
