//! Parallel traversal with per-worker scratch context
//! 带每工作线程临时上下文的并行遍历
//!
//! Workers share `&Reader` without locks. Scratch buffers live in the context
//! built by `init`, one per rayon work split, never shared between threads.
//! 工作线程无锁共享 `&Reader`。临时缓冲位于 `init` 构建的上下文中，
//! 每个 rayon 任务分片一个，不在线程间共享。

use rayon::prelude::*;

use crate::{Item, Key, Reader, Result};

impl<K: Key> Reader<K> {
  /// Run `f` on every record in physical order positions `[0, size)`
  /// 对物理位置 `[0, size)` 上的每条记录执行 `f`
  pub fn par_for_each<C, I, F>(&self, init: I, f: F) -> Result<()>
  where
    I: Fn() -> C + Sync + Send,
    F: Fn(&mut C, Item<'_, K>) + Sync + Send,
  {
    let s = self.state()?;
    (0..s.len())
      .into_par_iter()
      .for_each_init(init, |ctx, pos| f(ctx, s.item(pos)));
    Ok(())
  }

  /// Map every record, results come back in physical order
  /// 映射每条记录，结果按物理顺序返回
  pub fn par_map<C, T, I, F>(&self, init: I, f: F) -> Result<Vec<T>>
  where
    T: Send,
    I: Fn() -> C + Sync + Send,
    F: Fn(&mut C, Item<'_, K>) -> T + Sync + Send,
  {
    let s = self.state()?;
    Ok(
      (0..s.len())
        .into_par_iter()
        .map_init(init, |ctx, pos| f(ctx, s.item(pos)))
        .collect(),
    )
  }
}
