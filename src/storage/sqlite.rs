use crate::model::{AnalysisReport, AnalysisResult, Competitor, StorageError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

/// Competitor registry and analysis history on SQLite.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database at `db_path` and creates missing tables.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::migrate(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self { conn })
    }

    fn migrate(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS competitors (
                name TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                twitter TEXT,
                linkedin TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS analysis_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                competitor TEXT NOT NULL,
                analyzer TEXT NOT NULL,
                analyzed_at TEXT NOT NULL,
                status TEXT NOT NULL,
                payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_results_competitor
                ON analysis_results (competitor, analyzer, id);
            ",
        )?;
        Ok(())
    }

    /// Inserts a competitor or updates an existing one; `created_at` of an
    /// existing record is kept.
    pub fn add_competitor(&self, competitor: &Competitor) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO competitors (name, url, twitter, linkedin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                url = excluded.url,
                twitter = excluded.twitter,
                linkedin = excluded.linkedin",
            params![
                &competitor.name,
                &competitor.url,
                &competitor.twitter,
                &competitor.linkedin,
                &competitor.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_competitor(&self, name: &str) -> Result<Option<Competitor>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, url, twitter, linkedin, created_at FROM competitors WHERE name = ?1",
        )?;
        let mut rows = stmt.query(params![name])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::map_competitor(row)?)),
            None => Ok(None),
        }
    }

    pub fn list_competitors(&self) -> Result<Vec<Competitor>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, url, twitter, linkedin, created_at FROM competitors ORDER BY name ASC",
        )?;
        let rows = stmt.query_map([], Self::map_competitor)?;

        let mut competitors = Vec::new();
        for competitor in rows {
            competitors.push(competitor?);
        }
        Ok(competitors)
    }

    /// Removes the competitor and its stored results. Returns false when no
    /// such competitor exists.
    pub fn remove_competitor(&self, name: &str) -> Result<bool, StorageError> {
        let removed = self
            .conn
            .execute("DELETE FROM competitors WHERE name = ?1", params![name])?;
        self.conn
            .execute("DELETE FROM analysis_results WHERE competitor = ?1", params![name])?;
        Ok(removed > 0)
    }

    pub fn save_report(&self, report: &AnalysisReport) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        for result in report.results.values() {
            let payload = serde_json::to_string(result).map_err(|e| StorageError::Corrupt(e.to_string()))?;
            let status = if result.is_success() { "success" } else { "failure" };
            tx.execute(
                "INSERT INTO analysis_results (competitor, analyzer, analyzed_at, status, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    result.competitor(),
                    result.kind().as_str(),
                    result.analyzed_at().to_rfc3339(),
                    status,
                    payload,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Newest stored result per analyzer, or `None` when nothing was stored.
    pub fn latest_results(&self, name: &str) -> Result<Option<AnalysisReport>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM analysis_results r
             WHERE competitor = ?1
               AND id = (SELECT MAX(id) FROM analysis_results
                         WHERE competitor = r.competitor AND analyzer = r.analyzer)",
        )?;
        let rows = stmt.query_map(params![name], |row| row.get::<_, String>(0))?;

        let mut report = AnalysisReport::new(name);
        let mut newest: Option<DateTime<Utc>> = None;
        for payload in rows {
            let result = Self::decode_result(&payload?)?;
            newest = newest.max(Some(result.analyzed_at()));
            report.insert(result);
        }

        if report.results.is_empty() {
            return Ok(None);
        }
        if let Some(at) = newest {
            report.analyzed_at = at;
        }
        Ok(Some(report))
    }

    /// Most recent results first.
    pub fn history(&self, name: &str, limit: usize) -> Result<Vec<AnalysisResult>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM analysis_results WHERE competitor = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![name, limit as i64], |row| row.get::<_, String>(0))?;

        let mut results = Vec::new();
        for payload in rows {
            results.push(Self::decode_result(&payload?)?);
        }
        Ok(results)
    }

    fn decode_result(payload: &str) -> Result<AnalysisResult, StorageError> {
        serde_json::from_str(payload).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn map_competitor(row: &Row) -> Result<Competitor, rusqlite::Error> {
        let created_at_str: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(Competitor {
            name: row.get(0)?,
            url: row.get(1)?,
            twitter: row.get(2)?,
            linkedin: row.get(3)?,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalyzerKind, Findings, NewsFindings, WebFindings};

    fn acme() -> Competitor {
        Competitor::new("Acme", "https://acme.test/").with_twitter("acme")
    }

    #[test]
    fn competitor_crud() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.add_competitor(&acme()).unwrap();
        storage
            .add_competitor(&Competitor::new("Beta", "https://beta.test/"))
            .unwrap();

        let stored = storage.get_competitor("Acme").unwrap().unwrap();
        assert_eq!(stored.url, "https://acme.test/");
        assert_eq!(stored.twitter.as_deref(), Some("acme"));
        assert!(stored.linkedin.is_none());

        let names: Vec<_> = storage
            .list_competitors()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Acme", "Beta"]);

        assert!(storage.remove_competitor("Acme").unwrap());
        assert!(!storage.remove_competitor("Acme").unwrap());
        assert!(storage.get_competitor("Acme").unwrap().is_none());
    }

    #[test]
    fn update_keeps_created_at() {
        let storage = SqliteStorage::in_memory().unwrap();
        let original = acme();
        storage.add_competitor(&original).unwrap();

        let mut updated = Competitor::new("Acme", "https://acme.example/");
        updated.created_at = original.created_at + chrono::Duration::days(1);
        storage.add_competitor(&updated).unwrap();

        let stored = storage.get_competitor("Acme").unwrap().unwrap();
        assert_eq!(stored.url, "https://acme.example/");
        assert_eq!(stored.created_at.timestamp(), original.created_at.timestamp());
        assert!(stored.twitter.is_none());
    }

    #[test]
    fn latest_results_pick_newest_per_analyzer() {
        let storage = SqliteStorage::in_memory().unwrap();

        let mut first = AnalysisReport::new("Acme");
        first.insert(AnalysisResult::failure(AnalyzerKind::Web, "Acme", "down"));
        first.insert(AnalysisResult::success("Acme", Findings::News(NewsFindings::default())));
        storage.save_report(&first).unwrap();

        let mut second = AnalysisReport::new("Acme");
        let web = WebFindings {
            title: Some("Acme".into()),
            ..Default::default()
        };
        second.insert(AnalysisResult::success("Acme", Findings::Web(web)));
        storage.save_report(&second).unwrap();

        let latest = storage.latest_results("Acme").unwrap().unwrap();
        assert_eq!(latest.results.len(), 2);
        assert!(latest.get(AnalyzerKind::Web).unwrap().is_success());
        assert!(latest.get(AnalyzerKind::News).unwrap().is_success());

        let history = storage.history("Acme", 10).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].kind(), AnalyzerKind::Web);
        assert!(history[0].is_success());

        assert!(storage.latest_results("Nobody").unwrap().is_none());
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.db");
        let path = path.to_str().unwrap();

        SqliteStorage::new(path).unwrap().add_competitor(&acme()).unwrap();
        let reopened = SqliteStorage::new(path).unwrap();
        assert!(reopened.get_competitor("Acme").unwrap().is_some());
    }
}
