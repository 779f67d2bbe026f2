//! Reader configuration
//! 读取器配置

use fdb_map::{Codec, MapConf};

use crate::{Error, Result};

/// Access mode, replaces the USE_INDEX / USE_DATA / USE_WRITABLE bitmask
/// 访问模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
  /// Load the index file
  /// 加载索引文件
  pub index: bool,
  /// Map the data file
  /// 映射数据文件
  pub data: bool,
  /// Map the data file read-write
  /// 读写映射数据文件
  pub writable: bool,
}

impl Default for Mode {
  fn default() -> Self {
    Self {
      index: true,
      data: true,
      writable: false,
    }
  }
}

impl Mode {
  pub const INDEX: Self = Self {
    index: true,
    data: false,
    writable: false,
  };

  pub const WRITABLE: Self = Self {
    index: true,
    data: true,
    writable: true,
  };

  pub fn check(self, codec: Codec) -> Result<()> {
    if !self.index && !self.data {
      return Err(Error::InvalidMode("neither index nor data requested"));
    }
    if self.writable && !self.data {
      return Err(Error::InvalidMode("writable requires data"));
    }
    if self.writable && !codec.is_none() {
      return Err(Error::InvalidMode("compressed store cannot be writable"));
    }
    Ok(())
  }
}

/// Reader configuration options
/// 读取器配置选项
#[derive(Debug, Clone, Copy)]
pub enum Conf {
  /// Access mode
  /// 访问模式
  Mode(Mode),

  /// Codec of the data file
  /// 数据文件压缩算法
  Codec(Codec),

  /// Page the data file in at open
  /// 打开时预读数据文件
  Prefetch(bool),
}

/// Internal configuration struct
/// 内部配置结构体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
  pub mode: Mode,
  pub codec: Codec,
  pub prefetch: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      mode: Mode::default(),
      codec: Codec::None,
      prefetch: default::PREFETCH,
    }
  }
}

impl From<&[Conf]> for Config {
  fn from(conf_li: &[Conf]) -> Self {
    let mut config = Self::default();
    for &conf in conf_li {
      match conf {
        Conf::Mode(v) => config.mode = v,
        Conf::Codec(v) => config.codec = v,
        Conf::Prefetch(v) => config.prefetch = v,
      }
    }
    config
  }
}

impl Config {
  #[inline]
  pub fn map_conf(&self) -> MapConf {
    MapConf {
      writable: self.mode.writable,
      codec: self.codec,
    }
  }
}

/// Default values
/// 默认值
pub mod default {
  /// Index field separator
  /// 索引字段分隔符
  pub const SEP: u8 = b'\t';

  /// Record terminator in the data file
  /// 数据文件中的记录结束符
  pub const TERMINATOR: u8 = 0;

  pub const PREFETCH: bool = false;
}
