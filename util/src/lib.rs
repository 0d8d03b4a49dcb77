mod timer;
pub use timer::Timer;

#[derive(thiserror::Error, Debug)]
#[error("Filesystem path is not valid UTF-8")]
pub struct PathEncodingError;

pub type Hasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;
pub type HashMap<K, V> = std::collections::HashMap<K, V, Hasher>;
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, Hasher>;
pub type IndexSet<T> = indexmap::IndexSet<T, Hasher>;
