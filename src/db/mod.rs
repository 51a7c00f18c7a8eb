mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "idea-shaper")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("idea-shaper.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Template operations
    // ============================================================

    /// All templates, newest first.
    pub fn get_all_templates(&self) -> Result<Vec<Template>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, description, content, created_at, updated_at
             FROM templates ORDER BY created_at DESC, rowid DESC",
        )?;

        let templates = stmt
            .query_map([], template_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(templates)
    }

    pub fn get_template(&self, id: Uuid) -> Result<Option<Template>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, description, content, created_at, updated_at
             FROM templates WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(template_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_template(&self, input: CreateTemplateInput) -> Result<Template> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO templates (id, name, description, content, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.description,
                &input.content,
                timestamp(now),
            ),
        )?;

        Ok(Template {
            id,
            name: input.name,
            description: input.description,
            content: input.content,
            created_at: now,
            updated_at: None,
        })
    }

    pub fn update_template(&self, id: Uuid, input: UpdateTemplateInput) -> Result<Option<Template>> {
        let Some(existing) = self.get_template(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.unwrap_or(existing.description);
        let content = input.content.unwrap_or(existing.content);

        conn.execute(
            "UPDATE templates SET name = ?, description = ?, content = ?, updated_at = ? WHERE id = ?",
            (&name, &description, &content, timestamp(now), id.to_string()),
        )?;

        Ok(Some(Template {
            id,
            name,
            description,
            content,
            created_at: existing.created_at,
            updated_at: Some(now),
        }))
    }

    /// Delete a template. Documents generated from it keep their content
    /// and lose the reference.
    pub fn delete_template(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE document_history SET template_id = NULL WHERE template_id = ?",
            [id.to_string()],
        )?;
        let rows = tx.execute("DELETE FROM templates WHERE id = ?", [id.to_string()])?;
        tx.commit()?;
        Ok(rows > 0)
    }

    // ============================================================
    // Document history operations
    // ============================================================

    /// All saved documents, newest first.
    pub fn get_all_documents(&self) -> Result<Vec<DocumentHistory>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, title, content, template_id, created_at
             FROM document_history ORDER BY created_at DESC, rowid DESC",
        )?;

        let documents = stmt
            .query_map([], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(documents)
    }

    pub fn get_document(&self, id: Uuid) -> Result<Option<DocumentHistory>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, title, content, template_id, created_at
             FROM document_history WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(document_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_document(&self, input: CreateDocumentInput) -> Result<DocumentHistory> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO document_history (id, title, content, template_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.title,
                &input.content,
                input.template_id.map(|t| t.to_string()),
                timestamp(now),
            ),
        )?;

        Ok(DocumentHistory {
            id,
            title: input.title,
            content: input.content,
            template_id: input.template_id,
            created_at: now,
        })
    }

    pub fn delete_document(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM document_history WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Remove every saved document. Returns how many were deleted.
    pub fn clear_documents(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM document_history", [])?;
        Ok(rows)
    }
}

fn template_from_row(row: &Row<'_>) -> rusqlite::Result<Template> {
    Ok(Template {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        content: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
        updated_at: row.get::<_, Option<String>>(5)?.map(parse_datetime),
    })
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentHistory> {
    Ok(DocumentHistory {
        id: parse_uuid(row.get::<_, String>(0)?),
        title: row.get(1)?,
        content: row.get(2)?,
        template_id: row.get::<_, Option<String>>(3)?.map(parse_uuid),
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
