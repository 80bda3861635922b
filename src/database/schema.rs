use crate::database::DbConn;
use crate::error::AppResult;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id TEXT PRIMARY KEY
  , title TEXT
  , url TEXT NOT NULL
  , download_url TEXT
  , taken_at TEXT NOT NULL
  , created_at TEXT NOT NULL DEFAULT (datetime('now'))
  , updated_at TEXT NOT NULL DEFAULT (datetime('now'))
  , hidden INTEGER NOT NULL DEFAULT 0
  , favorite INTEGER NOT NULL DEFAULT 0
  , make TEXT
  , model TEXT
  , lens_make TEXT
  , lens_model TEXT
  , focal_length REAL
  , f_number REAL
  , iso INTEGER
  , exposure_time TEXT
  , film TEXT
  , recipe_title TEXT
  , tags TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_photos_taken_at ON photos (taken_at);

CREATE TABLE IF NOT EXISTS album_photos (
    album_id TEXT NOT NULL
  , photo_id TEXT NOT NULL REFERENCES photos (id) ON DELETE CASCADE
  , PRIMARY KEY (album_id, photo_id)
);

CREATE TABLE IF NOT EXISTS share_links (
    key TEXT PRIMARY KEY
  , album_id TEXT NOT NULL DEFAULT ''
  , allow_download INTEGER NOT NULL DEFAULT 1
  , expires_at TEXT
  , created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

pub fn init_database(conn: &DbConn) -> AppResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
