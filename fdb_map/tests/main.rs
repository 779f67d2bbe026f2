//! fdb_map tests
//! fdb_map 测试

use std::{fs, io::Write};

use aok::{OK, Void};
use fdb_map::{Codec, Error, Map, MapConf, enc};
use log::info;
use tempfile::tempdir;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

const DATA: &[u8] = b"ACGT\0header one\nline two\0\0tail\0";

#[test]
fn test_map_read() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("db");
  fs::write(&path, DATA)?;

  let map = Map::open(&path, MapConf::default())?;
  assert_eq!(map.as_slice(), DATA);
  assert_eq!(map.len(), DATA.len());
  assert_eq!(map.path(), path.as_path());
  assert_eq!(map.file_len()?, DATA.len() as u64);
  map.advise_willneed()?;
  map.flush()?;

  info!("map read ok");
  OK
}

#[test]
fn test_map_missing() {
  let dir = tempdir().unwrap();
  let r = Map::open(dir.path().join("nope"), MapConf::default());
  assert!(matches!(r, Err(Error::Io(_))));
}

#[test]
fn test_map_empty() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("empty");
  fs::write(&path, b"")?;
  let r = Map::open(&path, MapConf::default());
  assert!(matches!(r, Err(Error::Empty(p)) if p == path));
  OK
}

#[test]
fn test_map_read_only_has_no_mut() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("db");
  fs::write(&path, DATA)?;
  let mut map = Map::open(&path, MapConf::default())?;
  assert!(map.as_mut_slice().is_none());
  OK
}

#[test]
fn test_map_writable() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("db");
  fs::write(&path, DATA)?;

  let conf = MapConf {
    writable: true,
    codec: Codec::None,
  };
  let mut map = Map::open(&path, conf)?;
  let buf = map.as_mut_slice().expect("writable");
  buf[0] = b'T';
  map.flush()?;
  drop(map);

  let on_disk = fs::read(&path)?;
  assert_eq!(on_disk[0], b'T');
  assert_eq!(&on_disk[1..], &DATA[1..]);
  OK
}

#[test]
fn test_remap_sees_append() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("db");
  fs::write(&path, DATA)?;

  let map = Map::open(&path, MapConf::default())?;
  assert_eq!(map.len(), DATA.len());

  fs::OpenOptions::new()
    .append(true)
    .open(&path)?
    .write_all(b"more\0")?;

  let map = map.remap()?;
  assert_eq!(map.len(), DATA.len() + 5);
  assert!(map.as_slice().ends_with(b"more\0"));
  OK
}

#[test]
fn test_compressed() -> Void {
  let dir = tempdir()?;
  for codec in [Codec::Zstd, Codec::Lz4] {
    let path = dir.path().join(format!("db_{codec:?}"));
    fs::write(&path, enc(codec, DATA)?)?;

    let conf = MapConf {
      writable: false,
      codec,
    };
    let map = Map::open(&path, conf)?;
    assert_eq!(map.as_slice(), DATA);
    map.advise_willneed()?;
    info!("{codec:?} decoded {} bytes", map.len());
  }
  OK
}

#[test]
fn test_writable_compressed_rejected() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("db");
  fs::write(&path, enc(Codec::Zstd, DATA)?)?;
  let conf = MapConf {
    writable: true,
    codec: Codec::Zstd,
  };
  assert!(matches!(
    Map::open(&path, conf),
    Err(Error::WritableCompressed)
  ));
  OK
}

#[test]
fn test_corrupt_zstd() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("db");
  fs::write(&path, b"definitely not zstd")?;
  let conf = MapConf {
    writable: false,
    codec: Codec::Zstd,
  };
  assert!(matches!(Map::open(&path, conf), Err(Error::Zstd(_))));
  OK
}

#[test]
fn test_compressed_empty() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("db");
  fs::write(&path, enc(Codec::Zstd, b"")?)?;
  let conf = MapConf {
    writable: false,
    codec: Codec::Zstd,
  };
  assert!(matches!(Map::open(&path, conf), Err(Error::Empty(_))));
  OK
}
