pub mod environment;
pub mod log;
pub mod schema;

pub type HashMap<K, V> = ahash::AHashMap<K, V>;
