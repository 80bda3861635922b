//! Filtering, ordering and facet counting over an in-memory photo list.
//!
//! Both providers load the photos visible to a context and then run them
//! through these functions, so list semantics match across backends.

use std::collections::BTreeMap;

use crate::models::{
    Camera, CameraCount, DateRange, FilmCount, FocalLengthCount, GetPhotosOptions, HiddenFilter,
    Lens, LensCount, Photo, PhotoStamp, PhotosMeta, PhotosNear, RecipeCount, SortBy, TagCount,
};

fn slug(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn camera_key(make: &str, model: &str) -> String {
    slug(&format!("{} {}", make, model))
}

pub fn lens_key(make: Option<&str>, model: &str) -> String {
    match make {
        Some(make) if !make.is_empty() => slug(&format!("{} {}", make, model)),
        _ => slug(model),
    }
}

fn photo_camera_key(photo: &Photo) -> Option<String> {
    match (&photo.make, &photo.model) {
        (Some(make), Some(model)) => Some(camera_key(make, model)),
        _ => None,
    }
}

fn photo_lens_key(photo: &Photo) -> Option<String> {
    photo
        .lens_model
        .as_deref()
        .map(|model| lens_key(photo.lens_make.as_deref(), model))
}

fn passes_filters(photo: &Photo, options: &GetPhotosOptions) -> bool {
    let hidden_ok = match options.hidden {
        HiddenFilter::Exclude => !photo.hidden,
        HiddenFilter::Include => true,
        HiddenFilter::Only => photo.hidden,
    };
    if !hidden_ok {
        return false;
    }

    if let Some(tag) = &options.tag {
        if !photo.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            return false;
        }
    }

    if let Some(camera) = &options.camera {
        if photo_camera_key(photo).as_deref() != Some(camera.as_str()) {
            return false;
        }
    }

    if let Some(lens) = &options.lens {
        if photo_lens_key(photo).as_deref() != Some(lens.as_str()) {
            return false;
        }
    }

    if let Some(focal) = options.focal_length {
        if photo.focal_length.map(|f| f.round()) != Some(focal.round()) {
            return false;
        }
    }

    if let Some(favorite) = options.favorite {
        if photo.favorite != favorite {
            return false;
        }
    }

    true
}

/// Filtered and sorted, without paging.
pub fn filter_photos(photos: Vec<Photo>, options: &GetPhotosOptions) -> Vec<Photo> {
    let mut photos: Vec<Photo> = photos
        .into_iter()
        .filter(|p| passes_filters(p, options))
        .collect();

    match options.sort_by {
        SortBy::TakenAt => photos.sort_by(|a, b| b.taken_at.cmp(&a.taken_at).then(a.id.cmp(&b.id))),
        SortBy::TakenAtOldestFirst => {
            photos.sort_by(|a, b| a.taken_at.cmp(&b.taken_at).then(a.id.cmp(&b.id)))
        }
        SortBy::CreatedAt => {
            photos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)))
        }
        SortBy::CreatedAtOldestFirst => {
            photos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
        }
    }

    photos
}

pub fn apply_options(photos: Vec<Photo>, options: &GetPhotosOptions) -> Vec<Photo> {
    let filtered = filter_photos(photos, options);
    let offset = options.offset.unwrap_or(0);

    match options.limit {
        Some(limit) => filtered.into_iter().skip(offset).take(limit).collect(),
        None => filtered.into_iter().skip(offset).collect(),
    }
}

pub fn photos_meta(photos: Vec<Photo>, options: &GetPhotosOptions) -> PhotosMeta {
    let filtered = filter_photos(photos, options);
    let start = filtered.iter().map(|p| p.taken_at).min();
    let end = filtered.iter().map(|p| p.taken_at).max();

    PhotosMeta {
        count: filtered.len(),
        date_range: start.zip(end).map(|(start, end)| DateRange { start, end }),
    }
}

/// A window starting one photo before `photo_id`, `limit` photos long.
pub fn photos_near(
    photos: Vec<Photo>,
    photo_id: &str,
    options: &GetPhotosOptions,
    limit: usize,
) -> PhotosNear {
    let filtered = filter_photos(photos, options);

    match filtered.iter().position(|p| p.id == photo_id) {
        Some(index) => PhotosNear {
            photos: filtered
                .into_iter()
                .skip(index.saturating_sub(1))
                .take(limit)
                .collect(),
            index_number: Some(index + 1),
        },
        None => PhotosNear {
            photos: Vec::new(),
            index_number: None,
        },
    }
}

pub fn photo_stamps(photos: &[Photo]) -> Vec<PhotoStamp> {
    photos
        .iter()
        .map(|p| PhotoStamp {
            id: p.id.clone(),
            updated_at: p.updated_at,
        })
        .collect()
}

pub fn photo_ids(photos: &[Photo], limit: Option<usize>) -> Vec<String> {
    let ids = photos.iter().map(|p| p.id.clone());
    match limit.filter(|limit| *limit > 0) {
        Some(limit) => ids.take(limit).collect(),
        None => ids.collect(),
    }
}

fn visible(photos: &[Photo]) -> impl Iterator<Item = &Photo> {
    photos.iter().filter(|p| !p.hidden)
}

pub fn unique_tags(photos: &[Photo]) -> Vec<TagCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for photo in visible(photos) {
        for tag in &photo.tags {
            *counts.entry(tag.to_lowercase()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect()
}

pub fn unique_cameras(photos: &[Photo]) -> Vec<CameraCount> {
    let mut counts: BTreeMap<String, CameraCount> = BTreeMap::new();
    for photo in visible(photos) {
        let (Some(make), Some(model)) = (&photo.make, &photo.model) else {
            continue;
        };
        let key = camera_key(make, model);
        counts
            .entry(key.clone())
            .or_insert_with(|| CameraCount {
                camera_key: key,
                camera: Camera {
                    make: make.clone(),
                    model: model.clone(),
                },
                count: 0,
            })
            .count += 1;
    }

    counts.into_values().collect()
}

pub fn unique_lenses(photos: &[Photo]) -> Vec<LensCount> {
    let mut counts: BTreeMap<String, LensCount> = BTreeMap::new();
    for photo in visible(photos) {
        let Some(model) = &photo.lens_model else {
            continue;
        };
        let key = lens_key(photo.lens_make.as_deref(), model);
        counts
            .entry(key.clone())
            .or_insert_with(|| LensCount {
                lens_key: key,
                lens: Lens {
                    make: photo.lens_make.clone(),
                    model: model.clone(),
                },
                count: 0,
            })
            .count += 1;
    }

    counts.into_values().collect()
}

pub fn unique_focal_lengths(photos: &[Photo]) -> Vec<FocalLengthCount> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for photo in visible(photos) {
        if let Some(focal) = photo.focal_length.filter(|f| *f > 0.0) {
            *counts.entry(focal.round() as u32).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(focal_length, count)| FocalLengthCount {
            focal_length,
            count,
        })
        .collect()
}

pub fn unique_films(photos: &[Photo]) -> Vec<FilmCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for film in visible(photos).filter_map(|p| p.film.as_ref()) {
        *counts.entry(film.clone()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(film, count)| FilmCount { film, count })
        .collect()
}

pub fn unique_recipes(photos: &[Photo]) -> Vec<RecipeCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for recipe in visible(photos).filter_map(|p| p.recipe_title.as_ref()) {
        *counts.entry(recipe.clone()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(recipe, count)| RecipeCount { recipe, count })
        .collect()
}
