use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use jw_core::{
    domain::{User, UserId, UserProfile},
    ports::UserRegistry,
    Result,
};

use crate::{map_err, parse_ts, Database};

const USER_COLUMNS: &str =
    "id, telegram_id, username, first_name, last_name, is_active, created_at, updated_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(User {
        id: row.get(0)?,
        telegram_id: UserId(row.get(1)?),
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

pub(crate) fn select_by_telegram_id(
    conn: &Connection,
    telegram_id: UserId,
) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"),
        params![telegram_id.0],
        row_to_user,
    )
    .optional()
}

impl Database {
    pub fn count_users(&self) -> Result<i64> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(map_err)
    }
}

impl UserRegistry for Database {
    fn find_or_create(&self, profile: &UserProfile) -> Result<User> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let existing = select_by_telegram_id(&conn, profile.telegram_id).map_err(map_err)?;
        if existing.is_some() {
            conn.execute(
                "UPDATE users SET username = ?1, first_name = ?2, last_name = ?3, updated_at = ?4
                 WHERE telegram_id = ?5",
                params![
                    profile.username,
                    profile.first_name,
                    profile.last_name,
                    &now,
                    profile.telegram_id.0
                ],
            )
            .map_err(map_err)?;
        } else {
            conn.execute(
                "INSERT INTO users (telegram_id, username, first_name, last_name, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
                params![
                    profile.telegram_id.0,
                    profile.username,
                    profile.first_name,
                    profile.last_name,
                    &now
                ],
            )
            .map_err(map_err)?;
            tracing::info!(telegram_id = profile.telegram_id.0, "registered new user");
        }

        select_by_telegram_id(&conn, profile.telegram_id)
            .map_err(map_err)?
            .ok_or_else(|| {
                jw_core::Error::Storage(format!(
                    "user {} missing right after upsert",
                    profile.telegram_id.0
                ))
            })
    }
}
