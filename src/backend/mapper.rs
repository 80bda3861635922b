use crate::backend::Asset;
use crate::models::Photo;
use crate::share::ShareContext;

const HIDDEN_VISIBILITIES: [&str; 3] = ["hidden", "locked", "archive"];

fn with_key(url: String, share_key: &str) -> String {
    if share_key.is_empty() {
        url
    } else {
        let separator = if url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}key={}",
            url,
            separator,
            urlencoding::encode(share_key)
        )
    }
}

pub fn preview_url(base_url: &str, asset_id: &str, share_key: &str) -> String {
    with_key(
        format!("{}/api/assets/{}/thumbnail?size=preview", base_url, asset_id),
        share_key,
    )
}

pub fn original_url(base_url: &str, asset_id: &str, share_key: &str) -> String {
    with_key(
        format!("{}/api/assets/{}/original", base_url, asset_id),
        share_key,
    )
}

/// Converts a backend asset into a photo visible under `ctx`. Media URLs carry
/// the share key; the original is only linked when downloads are allowed.
pub fn asset_to_photo(asset: Asset, base_url: &str, ctx: &ShareContext) -> Photo {
    let exif = asset.exif_info.unwrap_or_default();

    let hidden = asset.is_archived
        || asset
            .visibility
            .as_deref()
            .is_some_and(|v| HIDDEN_VISIBILITIES.contains(&v));

    let title = exif
        .description
        .filter(|d| !d.trim().is_empty())
        .or(asset.original_file_name);

    let tags = asset
        .tags
        .into_iter()
        .map(|tag| tag.value.unwrap_or(tag.name))
        .collect();

    Photo {
        url: preview_url(base_url, &asset.id, &ctx.share_key),
        download_url: ctx
            .allow_download
            .then(|| original_url(base_url, &asset.id, &ctx.share_key)),
        id: asset.id,
        title,
        taken_at: exif.date_time_original.unwrap_or(asset.file_created_at),
        created_at: asset.file_created_at,
        updated_at: asset.updated_at,
        hidden,
        favorite: asset.is_favorite,
        make: exif.make,
        model: exif.model,
        lens_make: None,
        lens_model: exif.lens_model,
        focal_length: exif.focal_length,
        f_number: exif.f_number,
        iso: exif.iso,
        exposure_time: exif.exposure_time,
        film: None,
        recipe_title: None,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::asset;

    fn shared(allow_download: bool) -> ShareContext {
        ShareContext {
            share_key: "k/1".to_string(),
            album_id: "album".to_string(),
            allow_download,
            expires_at: None,
        }
    }

    #[test]
    fn test_urls_carry_encoded_share_key() {
        let photo = asset_to_photo(asset("a1", "2024-05-01T12:00:00Z"), "http://img", &shared(true));
        assert_eq!(
            photo.url,
            "http://img/api/assets/a1/thumbnail?size=preview&key=k%2F1"
        );
        assert_eq!(
            photo.download_url.as_deref(),
            Some("http://img/api/assets/a1/original?key=k%2F1")
        );
    }

    #[test]
    fn test_download_url_withheld_when_not_allowed() {
        let photo = asset_to_photo(asset("a1", "2024-05-01T12:00:00Z"), "http://img", &shared(false));
        assert!(photo.download_url.is_none());
    }

    #[test]
    fn test_unshared_urls_have_no_key() {
        let photo = asset_to_photo(
            asset("a1", "2024-05-01T12:00:00Z"),
            "http://img",
            &ShareContext::default(),
        );
        assert_eq!(photo.url, "http://img/api/assets/a1/thumbnail?size=preview");
    }

    #[test]
    fn test_exif_and_visibility_mapping() {
        let mut source = asset("a1", "2024-05-01T12:00:00Z");
        source.visibility = Some("locked".to_string());
        source.exif_info = Some(crate::backend::ExifInfo {
            make: Some("Leica".to_string()),
            model: Some("Q2".to_string()),
            date_time_original: Some("2020-01-02T03:04:05Z".parse().unwrap()),
            description: Some("Harbour".to_string()),
            ..Default::default()
        });

        let photo = asset_to_photo(source, "http://img", &shared(true));
        assert!(photo.hidden);
        assert_eq!(photo.title.as_deref(), Some("Harbour"));
        assert_eq!(photo.make.as_deref(), Some("Leica"));
        assert_eq!(photo.taken_at.to_rfc3339(), "2020-01-02T03:04:05+00:00");
        assert_eq!(photo.created_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }
}
