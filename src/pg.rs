//! Shared `PostgreSQL` plumbing for Diesel-backed adapters.
//!
//! Diesel connections are synchronous, so every adapter funnels its work
//! through [`run_blocking`] to keep the async executor's worker threads free.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};

/// `PostgreSQL` connection pool type shared by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection handed to blocking closures.
pub(crate) type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Boxed infrastructure error passed to adapter error constructors.
pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Builds a connection pool for the given database URL.
///
/// # Errors
///
/// Returns the pool error when the initial connections cannot be opened.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Checks out a connection and runs `f` on the blocking thread pool.
///
/// `map_err` converts pool checkout and join failures into the adapter's own
/// error type.
pub(crate) async fn run_blocking<F, T, E>(
    pool: &PgPool,
    map_err: fn(BoxError) -> E,
    f: F,
) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let owned_pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection: PooledConn = owned_pool.get().map_err(|err| map_err(Box::new(err)))?;
        f(&mut connection)
    })
    .await
    .map_err(|err| map_err(Box::new(err)))?
}
