#![cfg_attr(docsrs, feature(doc_cfg))]

//! fdb_map - Memory mapping of flat data files
//! 平面数据文件的内存映射

mod codec;
mod error;
mod map;

pub use codec::{Codec, dec, enc};
pub use error::{Error, Result};
pub use map::{Map, MapConf};
