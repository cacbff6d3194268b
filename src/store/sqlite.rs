//! SQLite implementation of the record store.
//!
//! One connection per store handle behind a mutex; ingestion tasks each
//! open their own handle, so the lock only serializes operations within a
//! single task. Timestamps are stored as RFC 3339 text, ids as uuid text,
//! quiz options as a JSON array string.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use uuid::Uuid;

use crate::domain::{
    artifact::{options_from_json, options_to_json},
    FlashCard, Folder, NewFlashCard, NewQuizQuestion, NewResource, QuizQuestion, Resource,
    ResourceImage, ResourceStatus, ResourceType,
};

use super::{FolderContents, RecordStore, ReleasedBlobs, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS resources (
    id              TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL,
    resource_type   TEXT NOT NULL,
    source_locator  TEXT,
    title           TEXT,
    transcript      TEXT,
    summary_notes   TEXT,
    glyph           TEXT,
    folder_id       INTEGER,
    status          TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_resources_owner  ON resources(owner_id);
CREATE INDEX IF NOT EXISTS idx_resources_folder ON resources(folder_id);

CREATE TABLE IF NOT EXISTS folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    TEXT NOT NULL,
    name        TEXT NOT NULL,
    parent_id   INTEGER,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS resource_images (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id    TEXT NOT NULL,
    owner_id       TEXT NOT NULL,
    image_locator  TEXT NOT NULL,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flash_cards (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id  TEXT NOT NULL,
    owner_id     TEXT NOT NULL,
    front        TEXT NOT NULL,
    back         TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quiz_questions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id     TEXT NOT NULL,
    owner_id        TEXT NOT NULL,
    question        TEXT NOT NULL,
    options         TEXT NOT NULL,
    correct_option  TEXT NOT NULL,
    created_at      TEXT NOT NULL
);
"#;

/// Column list for metadata loads. The transcript column is deliberately
/// absent: it is loaded on demand only.
const RESOURCE_COLUMNS: &str = "id, owner_id, resource_type, source_locator, title, \
     summary_notes, glyph, folder_id, status, created_at, updated_at";

/// SQLite-backed record store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) a store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a store that lives only in memory (tests).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Raw row image; converted into domain types outside the rusqlite closure
/// so parse failures surface as `StoreError::Corrupt`.
struct RawResource {
    id: String,
    owner_id: String,
    resource_type: String,
    source_locator: Option<String>,
    title: Option<String>,
    summary_notes: Option<String>,
    glyph: Option<String>,
    folder_id: Option<i64>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl RawResource {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            resource_type: row.get(2)?,
            source_locator: row.get(3)?,
            title: row.get(4)?,
            summary_notes: row.get(5)?,
            glyph: row.get(6)?,
            folder_id: row.get(7)?,
            status: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_resource(self) -> Result<Resource, StoreError> {
        Ok(Resource {
            id: parse_uuid(&self.id)?,
            owner_id: parse_uuid(&self.owner_id)?,
            resource_type: self
                .resource_type
                .parse::<ResourceType>()
                .map_err(StoreError::Corrupt)?,
            source_locator: self.source_locator,
            title: self.title,
            summary_notes: self.summary_notes,
            glyph: self.glyph,
            folder_id: self.folder_id,
            status: self
                .status
                .parse::<ResourceStatus>()
                .map_err(StoreError::Corrupt)?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Corrupt(format!("bad uuid {raw}: {e}")))
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {raw}: {e}")))
}

/// Require that the resource exists for this owner; used before any write
/// against a dependent table.
fn require_resource(conn: &Connection, id: &str, owner: &str) -> Result<(), StoreError> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM resources WHERE id = ?1 AND owner_id = ?2",
            params![id, owner],
            |row| row.get(0),
        )
        .optional()?;

    match exists {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound),
    }
}

/// Apply an UPDATE that must hit exactly one owner-scoped row.
fn update_one(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<(), StoreError> {
    let changed = conn.execute(sql, params)?;
    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

impl RecordStore for SqliteStore {
    fn create_resource(&self, new: NewResource) -> Result<Resource, StoreError> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        // Plain-text content is resident from the start; no extraction
        // stage ever runs for that type.
        let transcript = new.inline_content.as_deref();

        conn.execute(
            "INSERT INTO resources \
             (id, owner_id, resource_type, source_locator, title, transcript, \
              folder_id, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id.to_string(),
                new.owner_id.to_string(),
                new.resource_type.as_str(),
                new.source_locator,
                new.title,
                transcript,
                new.folder_id,
                ResourceStatus::Processing.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(Resource {
            id,
            owner_id: new.owner_id,
            resource_type: new.resource_type,
            source_locator: new.source_locator,
            title: new.title,
            summary_notes: None,
            glyph: None,
            folder_id: new.folder_id,
            status: ResourceStatus::Processing,
            created_at: now,
            updated_at: now,
        })
    }

    fn resource(&self, id: Uuid, owner: Uuid) -> Result<Resource, StoreError> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1 AND owner_id = ?2"
                ),
                params![id.to_string(), owner.to_string()],
                RawResource::from_row,
            )
            .optional()?;

        raw.ok_or(StoreError::NotFound)?.into_resource()
    }

    fn set_status(&self, id: Uuid, owner: Uuid, status: ResourceStatus) -> Result<(), StoreError> {
        let conn = self.conn();
        update_one(
            &conn,
            "UPDATE resources SET status = ?1, updated_at = ?2 \
             WHERE id = ?3 AND owner_id = ?4",
            params![
                status.as_str(),
                Utc::now().to_rfc3339(),
                id.to_string(),
                owner.to_string()
            ],
        )
    }

    fn transcript(&self, id: Uuid, owner: Uuid) -> Result<Option<String>, StoreError> {
        let conn = self.conn();
        let transcript: Option<Option<String>> = conn
            .query_row(
                "SELECT transcript FROM resources WHERE id = ?1 AND owner_id = ?2",
                params![id.to_string(), owner.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        transcript.ok_or(StoreError::NotFound)
    }

    fn set_transcript(&self, id: Uuid, owner: Uuid, transcript: &str) -> Result<(), StoreError> {
        let conn = self.conn();
        update_one(
            &conn,
            "UPDATE resources SET transcript = ?1, updated_at = ?2 \
             WHERE id = ?3 AND owner_id = ?4",
            params![
                transcript,
                Utc::now().to_rfc3339(),
                id.to_string(),
                owner.to_string()
            ],
        )
    }

    fn set_summary(
        &self,
        id: Uuid,
        owner: Uuid,
        notes: &str,
        glyph: Option<&str>,
    ) -> Result<(), StoreError> {
        let conn = self.conn();
        // COALESCE keeps an existing glyph when none was produced this time.
        update_one(
            &conn,
            "UPDATE resources SET summary_notes = ?1, glyph = COALESCE(?2, glyph), \
             updated_at = ?3 WHERE id = ?4 AND owner_id = ?5",
            params![
                notes,
                glyph,
                Utc::now().to_rfc3339(),
                id.to_string(),
                owner.to_string()
            ],
        )
    }

    fn set_title(&self, id: Uuid, owner: Uuid, title: &str) -> Result<(), StoreError> {
        let conn = self.conn();
        update_one(
            &conn,
            "UPDATE resources SET title = ?1, updated_at = ?2 \
             WHERE id = ?3 AND owner_id = ?4",
            params![
                title,
                Utc::now().to_rfc3339(),
                id.to_string(),
                owner.to_string()
            ],
        )
    }

    fn add_image(&self, id: Uuid, owner: Uuid, locator: &str) -> Result<ResourceImage, StoreError> {
        let conn = self.conn();
        require_resource(&conn, &id.to_string(), &owner.to_string())?;

        let now = Utc::now();
        conn.execute(
            "INSERT INTO resource_images (resource_id, owner_id, image_locator, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                id.to_string(),
                owner.to_string(),
                locator,
                now.to_rfc3339()
            ],
        )?;

        Ok(ResourceImage {
            id: conn.last_insert_rowid(),
            resource_id: id,
            owner_id: owner,
            image_locator: locator.to_string(),
            created_at: now,
        })
    }

    fn images(&self, id: Uuid, owner: Uuid) -> Result<Vec<ResourceImage>, StoreError> {
        let conn = self.conn();
        require_resource(&conn, &id.to_string(), &owner.to_string())?;

        let mut stmt = conn.prepare(
            "SELECT id, image_locator, created_at FROM resource_images \
             WHERE resource_id = ?1 AND owner_id = ?2 ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![id.to_string(), owner.to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut images = Vec::new();
        for row in rows {
            let (row_id, locator, created_at) = row?;
            images.push(ResourceImage {
                id: row_id,
                resource_id: id,
                owner_id: owner,
                image_locator: locator,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(images)
    }

    fn insert_flash_cards(
        &self,
        id: Uuid,
        owner: Uuid,
        cards: &[NewFlashCard],
    ) -> Result<usize, StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        require_resource(&tx, &id.to_string(), &owner.to_string())?;

        let now = Utc::now().to_rfc3339();
        for card in cards {
            tx.execute(
                "INSERT INTO flash_cards (resource_id, owner_id, front, back, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id.to_string(), owner.to_string(), card.front, card.back, now],
            )?;
        }
        tx.commit()?;

        Ok(cards.len())
    }

    fn insert_quiz_questions(
        &self,
        id: Uuid,
        owner: Uuid,
        questions: &[NewQuizQuestion],
    ) -> Result<usize, StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        require_resource(&tx, &id.to_string(), &owner.to_string())?;

        let now = Utc::now().to_rfc3339();
        for question in questions {
            tx.execute(
                "INSERT INTO quiz_questions \
                 (resource_id, owner_id, question, options, correct_option, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    owner.to_string(),
                    question.question,
                    options_to_json(&question.options),
                    question.correct_option,
                    now
                ],
            )?;
        }
        tx.commit()?;

        Ok(questions.len())
    }

    fn flash_cards(&self, id: Uuid, owner: Uuid) -> Result<Vec<FlashCard>, StoreError> {
        let conn = self.conn();
        require_resource(&conn, &id.to_string(), &owner.to_string())?;

        let mut stmt = conn.prepare(
            "SELECT id, front, back, created_at FROM flash_cards \
             WHERE resource_id = ?1 AND owner_id = ?2 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![id.to_string(), owner.to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut cards = Vec::new();
        for row in rows {
            let (row_id, front, back, created_at) = row?;
            cards.push(FlashCard {
                id: row_id,
                resource_id: id,
                owner_id: owner,
                front,
                back,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(cards)
    }

    fn quiz_questions(&self, id: Uuid, owner: Uuid) -> Result<Vec<QuizQuestion>, StoreError> {
        let conn = self.conn();
        require_resource(&conn, &id.to_string(), &owner.to_string())?;

        let mut stmt = conn.prepare(
            "SELECT id, question, options, correct_option, created_at FROM quiz_questions \
             WHERE resource_id = ?1 AND owner_id = ?2 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![id.to_string(), owner.to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut questions = Vec::new();
        for row in rows {
            let (row_id, question, options, correct_option, created_at) = row?;
            questions.push(QuizQuestion {
                id: row_id,
                resource_id: id,
                owner_id: owner,
                question,
                options: options_from_json(&options),
                correct_option,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(questions)
    }

    fn create_folder(
        &self,
        owner: Uuid,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<Folder, StoreError> {
        let conn = self.conn();
        if let Some(parent) = parent_id {
            require_folder(&conn, &owner.to_string(), parent)?;
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO folders (owner_id, name, parent_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                owner.to_string(),
                name,
                parent_id,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )?;

        Ok(Folder {
            id: conn.last_insert_rowid(),
            owner_id: owner,
            name: name.to_string(),
            parent_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn folder_contents(
        &self,
        owner: Uuid,
        parent_id: Option<i64>,
    ) -> Result<FolderContents, StoreError> {
        let conn = self.conn();
        let owner_str = owner.to_string();
        if let Some(parent) = parent_id {
            require_folder(&conn, &owner_str, parent)?;
        }

        let mut folders = Vec::new();
        {
            let mut stmt = conn.prepare(
                "SELECT id, name, parent_id, created_at, updated_at FROM folders \
                 WHERE owner_id = ?1 AND parent_id IS ?2 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![owner_str, parent_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;
            for row in rows {
                let (id, name, parent, created_at, updated_at) = row?;
                folders.push(Folder {
                    id,
                    owner_id: owner,
                    name,
                    parent_id: parent,
                    created_at: parse_ts(&created_at)?,
                    updated_at: parse_ts(&updated_at)?,
                });
            }
        }

        let mut resources = Vec::new();
        {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RESOURCE_COLUMNS} FROM resources \
                 WHERE owner_id = ?1 AND folder_id IS ?2 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![owner_str, parent_id], RawResource::from_row)?;
            for raw in rows {
                resources.push(raw?.into_resource()?);
            }
        }

        Ok(FolderContents { folders, resources })
    }

    fn delete_resource(&self, id: Uuid, owner: Uuid) -> Result<ReleasedBlobs, StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut released = ReleasedBlobs::default();
        delete_resource_tx(&tx, &id.to_string(), &owner.to_string(), &mut released)?;

        tx.commit()?;
        Ok(released)
    }

    fn delete_folder(&self, owner: Uuid, folder_id: i64) -> Result<ReleasedBlobs, StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let owner_str = owner.to_string();
        require_folder(&tx, &owner_str, folder_id)?;

        let mut released = ReleasedBlobs::default();
        delete_folder_tx(&tx, &owner_str, folder_id, &mut released)?;

        tx.commit()?;
        Ok(released)
    }
}

fn require_folder(conn: &Connection, owner: &str, folder_id: i64) -> Result<(), StoreError> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM folders WHERE id = ?1 AND owner_id = ?2",
            params![folder_id, owner],
            |row| row.get(0),
        )
        .optional()?;

    match exists {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound),
    }
}

/// Delete one resource and its dependents inside an open transaction.
///
/// Only blob-backed types release their source locator; a web video's
/// locator is a platform URL, not something we own.
fn delete_resource_tx(
    tx: &Transaction<'_>,
    id: &str,
    owner: &str,
    released: &mut ReleasedBlobs,
) -> Result<(), StoreError> {
    let row: Option<(String, Option<String>)> = tx
        .query_row(
            "SELECT resource_type, source_locator FROM resources \
             WHERE id = ?1 AND owner_id = ?2",
            params![id, owner],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((resource_type, source_locator)) = row else {
        return Err(StoreError::NotFound);
    };

    let blob_backed = matches!(
        resource_type.parse::<ResourceType>(),
        Ok(ResourceType::Document | ResourceType::Audio)
    );
    if blob_backed {
        if let Some(locator) = source_locator.filter(|l| !l.is_empty()) {
            released.locators.push(locator);
        }
    }

    {
        let mut stmt = tx.prepare(
            "SELECT image_locator FROM resource_images \
             WHERE resource_id = ?1 AND owner_id = ?2",
        )?;
        let rows = stmt.query_map(params![id, owner], |row| row.get::<_, String>(0))?;
        for locator in rows {
            released.locators.push(locator?);
        }
    }

    tx.execute(
        "DELETE FROM flash_cards WHERE resource_id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    tx.execute(
        "DELETE FROM quiz_questions WHERE resource_id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    tx.execute(
        "DELETE FROM resource_images WHERE resource_id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    tx.execute(
        "DELETE FROM resources WHERE id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;

    Ok(())
}

/// Depth-first folder cascade inside an open transaction.
fn delete_folder_tx(
    tx: &Transaction<'_>,
    owner: &str,
    folder_id: i64,
    released: &mut ReleasedBlobs,
) -> Result<(), StoreError> {
    let subfolders: Vec<i64> = {
        let mut stmt =
            tx.prepare("SELECT id FROM folders WHERE owner_id = ?1 AND parent_id = ?2")?;
        let rows = stmt.query_map(params![owner, folder_id], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    for subfolder in subfolders {
        delete_folder_tx(tx, owner, subfolder, released)?;
    }

    let resources: Vec<String> = {
        let mut stmt =
            tx.prepare("SELECT id FROM resources WHERE owner_id = ?1 AND folder_id = ?2")?;
        let rows = stmt.query_map(params![owner, folder_id], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    for resource_id in resources {
        delete_resource_tx(tx, &resource_id, owner, released)?;
    }

    tx.execute(
        "DELETE FROM folders WHERE id = ?1 AND owner_id = ?2",
        params![folder_id, owner],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn resource_load_is_owner_scoped() {
        let store = store();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let resource = store
            .create_resource(NewResource::new(owner, ResourceType::Audio).with_source("s3://b/k"))
            .unwrap();

        assert!(store.resource(resource.id, owner).is_ok());
        assert!(matches!(
            store.resource(resource.id, stranger),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn plain_text_content_lands_in_transcript_at_creation() {
        let store = store();
        let owner = Uuid::new_v4();

        let resource = store
            .create_resource(
                NewResource::new(owner, ResourceType::PlainText).with_content("lecture notes"),
            )
            .unwrap();

        assert_eq!(
            store.transcript(resource.id, owner).unwrap().as_deref(),
            Some("lecture notes")
        );
        assert_eq!(resource.status, ResourceStatus::Processing);
    }

    #[test]
    fn glyph_survives_summary_rewrite_without_new_glyph() {
        let store = store();
        let owner = Uuid::new_v4();
        let resource = store
            .create_resource(NewResource::new(owner, ResourceType::PlainText).with_content("x"))
            .unwrap();

        store
            .set_summary(resource.id, owner, "notes v1", Some("📚"))
            .unwrap();
        store.set_summary(resource.id, owner, "notes v2", None).unwrap();

        let reloaded = store.resource(resource.id, owner).unwrap();
        assert_eq!(reloaded.summary_notes.as_deref(), Some("notes v2"));
        assert_eq!(reloaded.glyph.as_deref(), Some("📚"));
    }

    #[test]
    fn images_come_back_in_upload_order() {
        let store = store();
        let owner = Uuid::new_v4();
        let resource = store
            .create_resource(NewResource::new(owner, ResourceType::ImageSet))
            .unwrap();

        store.add_image(resource.id, owner, "s3://b/one.jpg").unwrap();
        store.add_image(resource.id, owner, "s3://b/two.jpg").unwrap();
        store.add_image(resource.id, owner, "s3://b/three.jpg").unwrap();

        let locators: Vec<String> = store
            .images(resource.id, owner)
            .unwrap()
            .into_iter()
            .map(|i| i.image_locator)
            .collect();
        assert_eq!(locators, ["s3://b/one.jpg", "s3://b/two.jpg", "s3://b/three.jpg"]);
    }

    #[test]
    fn artifact_insert_requires_owned_resource() {
        let store = store();
        let owner = Uuid::new_v4();

        let cards = vec![NewFlashCard {
            front: "f".into(),
            back: "b".into(),
        }];
        let result = store.insert_flash_cards(Uuid::new_v4(), owner, &cards);
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[test]
    fn quiz_options_round_trip_through_storage() {
        let store = store();
        let owner = Uuid::new_v4();
        let resource = store
            .create_resource(NewResource::new(owner, ResourceType::PlainText).with_content("x"))
            .unwrap();

        let options = vec![
            "Paris".to_string(),
            "Lyon".to_string(),
            "Marseille".to_string(),
            "Toulouse".to_string(),
        ];
        let questions = vec![NewQuizQuestion {
            question: "Capital of France?".into(),
            options: options.clone(),
            correct_option: "Paris".into(),
        }];
        store
            .insert_quiz_questions(resource.id, owner, &questions)
            .unwrap();

        let stored = store.quiz_questions(resource.id, owner).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].options, options);
        assert_eq!(stored[0].correct_option, "Paris");
    }

    #[test]
    fn deleting_a_resource_cascades_and_releases_blobs() {
        let store = store();
        let owner = Uuid::new_v4();
        let resource = store
            .create_resource(
                NewResource::new(owner, ResourceType::Document).with_source("s3://bucket/doc.pdf"),
            )
            .unwrap();
        store
            .insert_flash_cards(
                resource.id,
                owner,
                &[NewFlashCard {
                    front: "f".into(),
                    back: "b".into(),
                }],
            )
            .unwrap();

        let released = store.delete_resource(resource.id, owner).unwrap();
        assert_eq!(released.locators, ["s3://bucket/doc.pdf"]);
        assert!(matches!(
            store.resource(resource.id, owner),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn deleting_a_folder_cascades_recursively() {
        let store = store();
        let owner = Uuid::new_v4();

        let top = store.create_folder(owner, "course", None).unwrap();
        let nested = store.create_folder(owner, "week 1", Some(top.id)).unwrap();
        let resource = store
            .create_resource(
                NewResource::new(owner, ResourceType::Audio)
                    .with_source("s3://bucket/lecture.mp3")
                    .with_folder(nested.id),
            )
            .unwrap();

        let released = store.delete_folder(owner, top.id).unwrap();
        assert_eq!(released.locators, ["s3://bucket/lecture.mp3"]);
        assert!(matches!(
            store.resource(resource.id, owner),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.folder_contents(owner, Some(nested.id)),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn web_video_locator_is_not_released_on_delete() {
        let store = store();
        let owner = Uuid::new_v4();
        let resource = store
            .create_resource(
                NewResource::new(owner, ResourceType::WebVideoLink)
                    .with_source("https://youtu.be/abcDEFghi12"),
            )
            .unwrap();

        let released = store.delete_resource(resource.id, owner).unwrap();
        assert!(released.locators.is_empty());
    }
}
