//! SQLite-backed account store.
//!
//! Accounts and activation records live in two tables joined one-to-one on
//! the account id. Timestamps are stored as integer microseconds since the
//! Unix epoch.

use crate::credential::make_credential;
use crate::{require_live, validate_new, AccountStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use enlist_types::{
    from_micros, Account, AccountId, ActivationRecord, ActivationToken, NewAccount,
    ACTIVATED_SENTINEL,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const ACCOUNT_COLUMNS: &str = "a.id, a.username, a.email, a.password, a.is_active, a.date_joined";

/// Persistent account store backed by SQLite.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            StoreError::Unavailable(format!("failed to open {}: {e}", path.display()))
        })?;
        debug!("opened account store at {}", path.display());
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(format!("failed to open in-memory store: {e}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(&format!(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                username_key TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL,
                email_key TEXT NOT NULL,
                password TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 0,
                date_joined INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS accounts_email
                ON accounts (email_key);

            CREATE TABLE IF NOT EXISTS activation_records (
                account_id TEXT PRIMARY KEY
                    REFERENCES accounts (id) ON DELETE CASCADE,
                token TEXT NOT NULL CHECK (token <> '')
            );

            CREATE UNIQUE INDEX IF NOT EXISTS activation_records_live_token
                ON activation_records (token)
                WHERE token <> '{ACTIVATED_SENTINEL}';
            "
        ))
        .map_err(|e| StoreError::Unavailable(format!("failed to init schema: {e}")))?;
        Ok(())
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    fn load_account(conn: &Connection, id: &str) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.id = ?1");
        Ok(conn.query_row(&sql, params![id], account_from_row).optional()?)
    }
}

impl AccountStore for SqliteStore {
    fn create_inactive(&self, new: NewAccount, token: &ActivationToken) -> StoreResult<Account> {
        validate_new(&new)?;
        require_live(token)?;

        let account = Account {
            id: AccountId::new(),
            username: new.username,
            email: new.email,
            password: make_credential(&new.password),
            is_active: false,
            date_joined: new.date_joined,
        };

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO accounts
                 (id, username, username_key, email, email_key, password, is_active, date_joined)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                account.id.to_string(),
                account.username,
                fold_case(&account.username),
                account.email,
                fold_case(&account.email),
                account.password,
                account.date_joined.timestamp_micros(),
            ],
        )
        .map_err(|e| StoreError::from_write(e, "username"))?;
        tx.execute(
            "INSERT INTO activation_records (account_id, token) VALUES (?1, ?2)",
            params![account.id.to_string(), token.as_str()],
        )
        .map_err(|e| StoreError::from_write(e, "activation token"))?;
        tx.commit()?;

        Ok(account)
    }

    fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let conn = self.conn()?;
        Self::load_account(&conn, &id.to_string())
    }

    fn find_record(&self, token: &ActivationToken) -> StoreResult<Option<ActivationRecord>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS}, r.token
             FROM activation_records r JOIN accounts a ON a.id = r.account_id
             WHERE r.token = ?1"
        );
        Ok(conn
            .query_row(&sql, params![token.as_str()], record_from_row)
            .optional()?)
    }

    fn activate(
        &self,
        token: &ActivationToken,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Option<Account>> {
        require_live(token)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let consumed: Option<String> = tx
            .query_row(
                "UPDATE activation_records SET token = ?1
                 WHERE token = ?2
                   AND account_id IN (SELECT id FROM accounts WHERE date_joined > ?3)
                 RETURNING account_id",
                params![ACTIVATED_SENTINEL, token.as_str(), cutoff.timestamp_micros()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(id) = consumed else {
            return Ok(None);
        };
        tx.execute(
            "UPDATE accounts SET is_active = 1 WHERE id = ?1",
            params![id],
        )?;
        let account = Self::load_account(&tx, &id)?
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        tx.commit()?;

        Ok(Some(account))
    }

    fn records(&self) -> StoreResult<Vec<ActivationRecord>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS}, r.token
             FROM activation_records r JOIN accounts a ON a.id = r.account_id
             ORDER BY a.date_joined, a.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], record_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_expired(&self, id: AccountId, cutoff: DateTime<Utc>) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM accounts
             WHERE id = ?1
               AND is_active = 0
               AND EXISTS (
                   SELECT 1 FROM activation_records r
                   WHERE r.account_id = accounts.id
                     AND (r.token = ?2 OR accounts.date_joined <= ?3)
               )",
            params![id.to_string(), ACTIVATED_SENTINEL, cutoff.timestamp_micros()],
        )?;
        // activation_records rows go with the account via ON DELETE CASCADE
        tx.commit()?;
        Ok(deleted == 1)
    }

    fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE username_key = ?1)",
            params![fold_case(username)],
            |row| row.get(0),
        )?)
    }

    fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE email_key = ?1)",
            params![fold_case(email)],
            |row| row.get(0),
        )?)
    }

    fn find_active_by_email(&self, email: &str) -> StoreResult<Vec<Account>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a
             WHERE a.is_active = 1 AND a.email_key = ?1
             ORDER BY a.date_joined"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![fold_case(email)], account_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Lookup key for case-insensitive matching. SQLite's NOCASE folds ASCII
/// only, so keys are lowered here with full Unicode rules.
fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let id: String = row.get(0)?;
    let micros: i64 = row.get(5)?;
    Ok(Account {
        id: AccountId::parse(&id).map_err(|e| conversion_error(0, Type::Text, e))?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        is_active: row.get(4)?,
        date_joined: from_micros(micros).map_err(|e| conversion_error(5, Type::Integer, e))?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ActivationRecord> {
    let token: String = row.get(6)?;
    Ok(ActivationRecord {
        account: account_from_row(row)?,
        token: ActivationToken::try_from(token)
            .map_err(|e| conversion_error(6, Type::Text, e))?,
    })
}

fn conversion_error<E>(idx: usize, ty: Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}
