mod rocksdb;

pub(crate) use rocksdb::RocksDBBackend;
