//! Logical key parsed from index text
//! 从索引文本解析的逻辑键

use std::{fmt::Debug, str::FromStr};

/// Ordered, copyable record identifier
/// 有序、可复制的记录标识
pub trait Key: Copy + Send + Sync + Ord + Debug + 'static {
  /// Parse from one index field, None if not a valid number
  /// 从一个索引字段解析，非法数字返回 None
  fn parse(field: &[u8]) -> Option<Self>;
}

#[inline]
pub(crate) fn num<T: FromStr>(field: &[u8]) -> Option<T> {
  std::str::from_utf8(field).ok()?.parse().ok()
}

macro_rules! impl_key {
  ($($t:ty),*) => {
    $(
      impl Key for $t {
        #[inline(always)]
        fn parse(field: &[u8]) -> Option<Self> {
          num(field)
        }
      }
    )*
  };
}

impl_key!(u16, u32, u64, usize, i32, i64);
