//! `Store` owns the SQLite connection pool and the `readings` table.
//! Rows are keyed by their normalized timestamp and written once; a second
//! write for the same timestamp is ignored rather than merged.
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self as diesel_r2d2, ConnectionManager, CustomizeConnection};
use failure::Fail;
use log::{debug, info};
use std::time::Duration;

use crate::{
    db::model::{DbReading, NewReading},
    schema::readings,
};

type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT_MS: u32 = 5_000;

embed_migrations!("../migrations");

#[derive(Debug, Fail)]
pub enum StoreError {
    #[fail(display = "connection pool error: {}", _0)]
    Pool(#[cause] r2d2::Error),
    #[fail(display = "query failed: {}", _0)]
    Query(#[cause] diesel::result::Error),
    #[fail(display = "migration failed: {}", _0)]
    Migration(#[cause] diesel_migrations::RunMigrationsError),
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Pool(err)
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        StoreError::Query(err)
    }
}

impl From<diesel_migrations::RunMigrationsError> for StoreError {
    fn from(err: diesel_migrations::RunMigrationsError) -> Self {
        StoreError::Migration(err)
    }
}

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel_r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel_r2d2::Error> {
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))
            .map_err(diesel_r2d2::Error::QueryError)
    }
}

#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    /// Open a pool over the SQLite file at `database_url`, creating the file
    /// if needed. Fails when the location cannot be opened.
    pub fn open(database_url: &str) -> Result<Store, StoreError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = r2d2::Pool::builder()
            .max_size(4)
            .connection_timeout(Duration::from_secs(5))
            .connection_customizer(Box::new(ConnectionOptions))
            .build(manager)?;
        Ok(Store { pool })
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<ConnectionManager<SqliteConnection>>, StoreError> {
        Ok(self.pool.get()?)
    }

    /// Create the readings table if absent. Safe to call on every startup.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        embedded_migrations::run(&conn)?;
        info!("store ready with {} readings", self.count()?);
        Ok(())
    }

    /// Insert-or-ignore keyed on timestamp. Returns whether a row was written;
    /// an existing row is never overwritten.
    pub fn insert(&self, reading: &NewReading) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let written = diesel::insert_or_ignore_into(readings::table)
            .values(reading)
            .execute(&conn)?;
        if written == 0 {
            debug!("reading {} already stored", reading.timestamp);
        }
        Ok(written > 0)
    }

    /// Most recent reading by timestamp ordering.
    pub fn latest(&self) -> Result<Option<DbReading>, StoreError> {
        let conn = self.conn()?;
        let reading = readings::table
            .order(readings::timestamp.desc())
            .first::<DbReading>(&conn)
            .optional()?;
        Ok(reading)
    }

    /// Up to `limit` readings, newest first. This is a row-count cap only;
    /// it approximates a time window when readings arrive at a fixed interval.
    pub fn recent(&self, limit: i64) -> Result<Vec<DbReading>, StoreError> {
        let conn = self.conn()?;
        let rows = readings::table
            .order(readings::timestamp.desc())
            .limit(limit)
            .load::<DbReading>(&conn)?;
        Ok(rows)
    }

    /// Readings at or after `cutoff` (an RFC 3339 UTC string), newest first,
    /// capped at `limit` rows.
    pub fn since(&self, cutoff: &str, limit: i64) -> Result<Vec<DbReading>, StoreError> {
        let conn = self.conn()?;
        let rows = readings::table
            .filter(readings::timestamp.ge(cutoff))
            .order(readings::timestamp.desc())
            .limit(limit)
            .load::<DbReading>(&conn)?;
        Ok(rows)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        Ok(readings::table.count().get_result(&conn)?)
    }

    pub fn pool_state(&self) -> r2d2::State {
        self.pool.state()
    }
}
