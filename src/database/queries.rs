pub mod photos {
    pub const SELECT_ALL: &str = r#"
    SELECT p.id
         , p.title
         , p.url
         , p.download_url
         , p.taken_at
         , p.created_at
         , p.updated_at
         , p.hidden
         , p.favorite
         , p.make
         , p.model
         , p.lens_make
         , p.lens_model
         , p.focal_length
         , p.f_number
         , p.iso
         , p.exposure_time
         , p.film
         , p.recipe_title
         , p.tags
      FROM photos p
     ORDER BY p.taken_at DESC
    "#;

    pub const SELECT_BY_ALBUM: &str = r#"
    SELECT p.id
         , p.title
         , p.url
         , p.download_url
         , p.taken_at
         , p.created_at
         , p.updated_at
         , p.hidden
         , p.favorite
         , p.make
         , p.model
         , p.lens_make
         , p.lens_model
         , p.focal_length
         , p.f_number
         , p.iso
         , p.exposure_time
         , p.film
         , p.recipe_title
         , p.tags
      FROM photos p
      JOIN album_photos ap ON ap.photo_id = p.id
     WHERE ap.album_id = ?
     ORDER BY p.taken_at DESC
    "#;

    pub const INSERT: &str = r#"
    INSERT INTO photos (
        id
      , title
      , url
      , download_url
      , taken_at
      , created_at
      , updated_at
      , hidden
      , favorite
      , make
      , model
      , lens_make
      , lens_model
      , focal_length
      , f_number
      , iso
      , exposure_time
      , film
      , recipe_title
      , tags
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#;
}

pub mod albums {
    pub const ADD_PHOTO: &str = r#"
    INSERT OR IGNORE INTO album_photos (album_id, photo_id)
    VALUES (?, ?)
    "#;
}

pub mod share_links {
    pub const SELECT_BY_KEY: &str = r#"
    SELECT key
         , album_id
         , allow_download
         , expires_at
      FROM share_links
     WHERE key = ?
    "#;

    pub const INSERT: &str = r#"
    INSERT INTO share_links (key, album_id, allow_download, expires_at)
    VALUES (?, ?, ?, ?)
    "#;
}
