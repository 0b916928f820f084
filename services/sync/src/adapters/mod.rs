pub mod clock;
pub mod connectivity;
pub mod kv;
pub mod remote;

pub use clock::SystemClock;
pub use connectivity::SharedConnectivity;
pub use kv::{JsonFileStore, MemoryStore, NullStore};
pub use remote::PgRemoteStore;
