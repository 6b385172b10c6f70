mod memory;
mod redb;

pub use self::memory::InMemoryStore;
pub use self::redb::RedbStore;
