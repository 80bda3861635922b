//! Reads against the local catalog tables.

use chrono::{DateTime, Utc};
use rusqlite::{types::Type, Row};

use crate::database::{fetch_all, fetch_one, queries, DbConn};
use crate::error::AppResult;
use crate::models::Photo;
use crate::share::ShareContext;
use crate::utils::parse_datetime;

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {}", raw).into(),
        )
    })
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<Photo> {
    let tags: String = row.get(19)?;

    Ok(Photo {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        download_url: row.get(3)?,
        taken_at: timestamp(row, 4)?,
        created_at: timestamp(row, 5)?,
        updated_at: timestamp(row, 6)?,
        hidden: row.get(7)?,
        favorite: row.get(8)?,
        make: row.get(9)?,
        model: row.get(10)?,
        lens_make: row.get(11)?,
        lens_model: row.get(12)?,
        focal_length: row.get(13)?,
        f_number: row.get(14)?,
        iso: row.get(15)?,
        exposure_time: row.get(16)?,
        film: row.get(17)?,
        recipe_title: row.get(18)?,
        tags: split_tags(&tags),
    })
}

pub fn all_photos(conn: &DbConn) -> AppResult<Vec<Photo>> {
    fetch_all(conn, queries::photos::SELECT_ALL, &[], photo_from_row)
}

pub fn album_photos(conn: &DbConn, album_id: &str) -> AppResult<Vec<Photo>> {
    fetch_all(
        conn,
        queries::photos::SELECT_BY_ALBUM,
        &[&album_id],
        photo_from_row,
    )
}

/// The share record for `key`, expired or not.
pub fn find_share_link(conn: &DbConn, key: &str) -> AppResult<Option<ShareContext>> {
    fetch_one(conn, queries::share_links::SELECT_BY_KEY, &[&key], |row| {
        let expires_at: Option<String> = row.get(3)?;
        let expires_at = match expires_at.filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(parse_datetime(&raw).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    Type::Text,
                    format!("invalid timestamp: {}", raw).into(),
                )
            })?),
            None => None,
        };

        Ok(ShareContext {
            share_key: row.get(0)?,
            album_id: row.get(1)?,
            allow_download: row.get(2)?,
            expires_at,
        })
    })
}
