/// Database plumbing: connection pool and schema migrations
///
/// Row-level queries live on the model types in [`crate::models`]; the
/// transactional store built on top of them is in [`crate::store`].

pub mod migrations;
pub mod pool;
