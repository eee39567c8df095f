use chrono::Utc;
use rusqlite::{params, Row};

use jw_core::{
    domain::{Alert, NewAlert, UserId},
    errors::Error,
    ports::AlertStore,
    Result,
};

use crate::{map_err, parse_ts, users::select_by_telegram_id, Database};

fn row_to_alert(row: &Row<'_>) -> rusqlite::Result<Alert> {
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(Alert {
        id: row.get(0)?,
        user_id: row.get(1)?,
        search_term: row.get(2)?,
        location: row.get(3)?,
        interval_hours: row.get(4)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

impl AlertStore for Database {
    fn create_alert(&self, alert: &NewAlert) -> Result<Alert> {
        let conn = self.conn()?;
        let owner = select_by_telegram_id(&conn, alert.owner)
            .map_err(map_err)?
            .ok_or_else(|| {
                Error::Storage(format!("user {} is not registered", alert.owner.0))
            })?;

        let now = Utc::now();
        let now_str = now.to_rfc3339();
        conn.execute(
            "INSERT INTO alerts (user_id, search_term, location, interval_hours, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                owner.id,
                &alert.search_term,
                &alert.location,
                alert.interval_hours,
                &now_str
            ],
        )
        .map_err(map_err)?;

        let id = conn.last_insert_rowid();
        tracing::info!(alert_id = id, telegram_id = alert.owner.0, "created alert");

        Ok(Alert {
            id,
            user_id: owner.id,
            search_term: alert.search_term.clone(),
            location: alert.location.clone(),
            interval_hours: alert.interval_hours,
            created_at: now,
            updated_at: now,
        })
    }

    fn list_alerts(&self, owner: UserId) -> Result<Vec<Alert>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT a.id, a.user_id, a.search_term, a.location, a.interval_hours, a.created_at, a.updated_at
                 FROM alerts a JOIN users u ON u.id = a.user_id
                 WHERE u.telegram_id = ?1
                 ORDER BY a.id",
            )
            .map_err(map_err)?;

        let rows = stmt
            .query_map(params![owner.0], row_to_alert)
            .map_err(map_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jw_core::{
        domain::{UserProfile, DEFAULT_ALERT_INTERVAL_HOURS},
        ports::UserRegistry,
    };

    fn register(db: &Database, id: i64) {
        db.find_or_create(&UserProfile {
            telegram_id: UserId(id),
            username: None,
            first_name: Some(format!("user{id}")),
            last_name: None,
        })
        .unwrap();
    }

    fn new_alert(owner: i64, term: &str, location: Option<&str>) -> NewAlert {
        NewAlert {
            owner: UserId(owner),
            search_term: term.to_string(),
            location: location.map(str::to_string),
            interval_hours: DEFAULT_ALERT_INTERVAL_HOURS,
        }
    }

    #[test]
    fn creates_and_lists_in_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        register(&db, 1);
        register(&db, 2);

        let a = db.create_alert(&new_alert(1, "nurse", None)).unwrap();
        db.create_alert(&new_alert(2, "welder", Some("Calgary, AB")))
            .unwrap();
        let c = db
            .create_alert(&NewAlert {
                interval_hours: 6,
                ..new_alert(1, "paramedic", Some("Toronto, ON"))
            })
            .unwrap();

        let mine = db.list_alerts(UserId(1)).unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0], a);
        assert_eq!(mine[1].id, c.id);
        assert_eq!(mine[1].location.as_deref(), Some("Toronto, ON"));
        assert_eq!(mine[1].interval_hours, 6);
        assert_eq!(mine[0].interval_hours, 24);

        assert_eq!(db.list_alerts(UserId(2)).unwrap().len(), 1);
        assert!(db.list_alerts(UserId(3)).unwrap().is_empty());
    }

    #[test]
    fn rejects_unregistered_owner() {
        let db = Database::open_in_memory().unwrap();
        let err = db.create_alert(&new_alert(99, "nurse", None)).unwrap_err();
        assert!(matches!(err, Error::Storage(m) if m.contains("not registered")));
    }

    #[test]
    fn foreign_key_is_enforced() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        let res = conn.execute(
            "INSERT INTO alerts (user_id, search_term, interval_hours, created_at, updated_at)
             VALUES (12345, 'x', 24, 'now', 'now')",
            [],
        );
        assert!(res.is_err());
    }
}
