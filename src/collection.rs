use std::io::Write;

use log::debug;
use rusqlite::{
    types::ValueRef,
    Connection,
    OpenFlags,
    Row,
};
use tempfile::NamedTempFile;

use crate::core::{
    models::RevlogOptions,
    AnkipeekError,
    RawNote,
    ReviewEvent,
};

const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Read-only handle over an in-memory collection image.
///
/// The bytes are spilled to a temp file and opened through SQLite's pager;
/// the file lives as long as the handle. All query shapes are fixed SELECT
/// statements; the only interpolated values are validated integers.
pub struct Collection {
    conn: Connection,
    _image: NamedTempFile,
}

impl Collection {
    pub fn open(bytes: &[u8]) -> Result<Self, AnkipeekError> {
        if bytes.len() < SQLITE_MAGIC.len() || &bytes[..SQLITE_MAGIC.len()] != SQLITE_MAGIC {
            return Err(AnkipeekError::InvalidDatabaseImage(
                "missing 'SQLite format 3' header".to_string(),
            ));
        }

        let mut image = NamedTempFile::new()?;
        image.write_all(bytes)?;
        image.flush()?;

        let conn = Connection::open_with_flags(
            image.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        debug!("Opened collection image ({} bytes)", bytes.len());
        Ok(Collection { conn, _image: image })
    }

    /// The two JSON text columns of the single `col` row: models and decks.
    pub fn schema_json(&self) -> Result<(String, String), AnkipeekError> {
        let row = self.conn.query_row("SELECT models, decks FROM col", [], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        Ok(row)
    }

    /// Every raw `(mid, flds)` note row, in table order.
    pub fn raw_notes(&self) -> Result<Vec<RawNote>, AnkipeekError> {
        let mut stmt = self.conn.prepare("SELECT mid, flds FROM notes")?;
        let rows = stmt.query_map([], |row| {
            Ok(RawNote { model_id: row.get(0)?, fields_blob: row.get(1)? })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// The revlog join: one row per review, outer-joined to its card and
    /// note so card/note/deck columns are nullable.
    pub fn review_events(&self, options: &RevlogOptions) -> Result<Vec<ReviewEvent>, AnkipeekError> {
        let order = if options.recent { " DESC" } else { "" };
        let limit = match options.limit {
            Some(n) if n > 0 => format!(" LIMIT {n}"),
            _ => String::new(),
        };

        let sql = format!(
            "SELECT revlog.id, revlog.ease, revlog.ivl, revlog.lastIvl, revlog.time, \
                    notes.flds, notes.sfld, \
                    cards.id, cards.reps, cards.lapses, cards.did, notes.mid, cards.ord \
             FROM revlog \
             LEFT OUTER JOIN cards ON revlog.cid = cards.id \
             LEFT OUTER JOIN notes ON cards.nid = notes.id \
             ORDER BY revlog.id{order}{limit}"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(ReviewEvent {
                rev_id: row.get(0)?,
                ease: row.get(1)?,
                interval: row.get(2)?,
                last_interval: row.get(3)?,
                time_to_answer_ms: row.get(4)?,
                note_facts_raw: row.get(5)?,
                note_sort_key: sort_key_as_text(row, 6)?,
                card_id: row.get(7)?,
                reps: row.get(8)?,
                lapses: row.get(9)?,
                deck_id: row.get(10)?,
                model_id: row.get(11)?,
                template_num: row.get(12)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

/// `notes.sfld` is declared TEXT but Anki stores bare integers in it for
/// numerically sorted fields, so read it through the dynamic value.
fn sort_key_as_text(row: &Row<'_>, idx: usize) -> Result<Option<String>, rusqlite::Error> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    };
    Ok(value)
}
