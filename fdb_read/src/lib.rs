#![cfg_attr(docsrs, feature(doc_cfg))]

//! fdb_read - Indexed reader over flat data files
//! 平面数据文件的索引读取器
//!
//! A store is a data file of NUL-terminated records plus a text index of
//! `key\toffset[\tlen]` lines. After `Reader::open` everything is frozen and
//! `&Reader` can be shared by any number of threads without locks.
//! 存储由 NUL 结尾记录的数据文件和 `key\toffset[\tlen]` 文本索引组成。
//! `Reader::open` 之后一切只读，`&Reader` 可被任意线程无锁共享。

mod conf;
mod error;
pub mod index;
mod key;
mod lens;
mod par;
mod reader;
mod sort;
mod translate;

pub use conf::{Conf, Config, Mode, default};
pub use error::{Error, Result};
pub use fdb_map::Codec;
pub use index::{Entry, count_line};
pub use key::Key;
pub use reader::{Item, Reader};
pub use sort::Sort;
pub use translate::Translator;
