//! Normalization of scraping API payloads into table records.
//!
//! The upstream API changed its response shape several times without a
//! version flag, so every field is resolved through an ordered list of
//! alternative paths. The first truthy value wins. When no alternative
//! resolves, the field takes its default (0 or "") and no error is raised:
//! a future schema that drops every known alias degrades that field silently.

use crate::domain::{ProfileRecord, ReelRecord, CAPTION_MAX_CHARS};
use crate::utils::{format_epoch_float, format_epoch_seconds, truncate_chars};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Key sequence into nested JSON objects
pub type FieldPath = &'static [&'static str];

pub const FOLLOWER_COUNT_PATHS: &[FieldPath] = &[
    &["edge_followed_by", "count"],
    &["follower_count"],
    &["followers"],
    &["followers_count"],
];
pub const DISPLAY_NAME_PATHS: &[FieldPath] = &[&["full_name"], &["name"], &["display_name"]];
pub const BIOGRAPHY_PATHS: &[FieldPath] = &[&["biography"], &["bio"]];

pub const REEL_ID_PATHS: &[FieldPath] = &[&["pk"], &["id"]];
pub const VIEW_COUNT_PATHS: &[FieldPath] =
    &[&["play_count"], &["ig_play_count"], &["video_view_count"]];
pub const LIKE_COUNT_PATHS: &[FieldPath] = &[&["edge_liked_by", "count"], &["like_count"]];
pub const COMMENT_COUNT_PATHS: &[FieldPath] =
    &[&["edge_media_to_comment", "count"], &["comment_count"]];

const REEL_URL_PREFIX: &str = "https://instagram.com/reel/";

/// Reels pulled out of one response, plus how many items were dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReelBatch {
    pub reels: Vec<ReelRecord>,
    pub skipped: usize,
}

/// JSON truthiness: null, false, 0, "", [] and {} are all falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Walks `path` through nested objects
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Reads a non-negative count from a number or numeric string
pub fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Reads a scalar as text; numbers are stringified
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First truthy value along `paths` that reads as a count, else 0
pub fn first_count(value: &Value, paths: &[FieldPath]) -> u64 {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .filter(|v| is_truthy(v))
        .find_map(as_count)
        .unwrap_or(0)
}

/// First truthy value along `paths` that reads as text, else ""
pub fn first_text(value: &Value, paths: &[FieldPath]) -> String {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .filter(|v| is_truthy(v))
        .find_map(as_text)
        .unwrap_or_default()
}

/// Builds the profile row for `handle` from a raw profile response.
/// A missing `data.user` object yields a record full of defaults.
pub fn extract_profile(raw: &Value, handle: &str, checked_at: &str) -> ProfileRecord {
    let empty = Value::Object(Map::new());
    let user = lookup(raw, &["data", "user"])
        .filter(|u| u.is_object())
        .unwrap_or(&empty);

    ProfileRecord {
        handle: handle.to_string(),
        display_name: first_text(user, DISPLAY_NAME_PATHS),
        follower_count: first_count(user, FOLLOWER_COUNT_PATHS),
        biography: first_text(user, BIOGRAPHY_PATHS),
        last_checked: checked_at.to_string(),
    }
}

/// Locates the media payload of a reels list item.
/// Older responses wrap it under `media`; newer ones put fields on the item.
pub fn media_payload(item: &Value) -> Option<&Value> {
    let obj = item.as_object()?;
    match obj.get("media") {
        Some(media) if is_truthy(media) => Some(media),
        Some(_) => None,
        None => Some(item),
    }
}

/// First of `pk`/`id` that is a non-empty scalar
pub fn reel_id(media: &Value) -> Option<String> {
    REEL_ID_PATHS
        .iter()
        .filter_map(|path| lookup(media, path))
        .filter(|v| is_truthy(v))
        .find_map(as_text)
}

pub fn reel_url(media: &Value) -> String {
    match media.get("code").and_then(as_text) {
        Some(code) => format!("{}{}", REEL_URL_PREFIX, code),
        None => String::new(),
    }
}

fn caption_from_edges(media: &Value) -> Option<&Value> {
    lookup(media, &["edge_media_to_caption", "edges"])?
        .as_array()?
        .first()
        .and_then(|edge| lookup(edge, &["node", "text"]))
        .filter(|v| is_truthy(v))
}

fn caption_from_field(media: &Value) -> Option<&Value> {
    media.get("caption").filter(|v| is_truthy(v))
}

fn caption_from_text_info(media: &Value) -> Option<&Value> {
    media
        .get("reusable_text_info")?
        .as_array()?
        .first()
        .and_then(|info| info.get("text"))
        .filter(|v| is_truthy(v))
}

/// Flattens a caption value to plain text. Structured captions give up their
/// `text` field when they have one and are serialized whole otherwise.
pub fn caption_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(obj) => match obj.get("text") {
            Some(Value::String(s)) => s.clone(),
            Some(text) if is_truthy(text) => text.to_string(),
            Some(_) => String::new(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Caption via edge list, flat field, then text-info list; truncated
pub fn resolve_caption(media: &Value) -> String {
    let steps: [fn(&Value) -> Option<&Value>; 3] =
        [caption_from_edges, caption_from_field, caption_from_text_info];
    steps
        .iter()
        .filter_map(|step| step(media))
        .map(caption_text)
        .find(|text| !text.is_empty())
        .map(|text| truncate_chars(&text, CAPTION_MAX_CHARS))
        .unwrap_or_default()
}

/// `taken_at` as a timestamp string. Epochs are converted; anything that
/// cannot be converted is passed through stringified.
pub fn posted_at(media: &Value) -> String {
    let raw = match media.get("taken_at") {
        Some(v) if is_truthy(v) => v,
        _ => return String::new(),
    };
    match raw {
        Value::Number(n) => n
            .as_i64()
            .and_then(format_epoch_seconds)
            .or_else(|| n.as_f64().and_then(format_epoch_float))
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds one reel row from a media payload; None when it has no id
pub fn extract_reel(media: &Value, owner_handle: &str, checked_at: &str) -> Option<ReelRecord> {
    let reel_id = reel_id(media)?;
    Some(ReelRecord {
        reel_id,
        owner_handle: owner_handle.to_string(),
        url: reel_url(media),
        caption: resolve_caption(media),
        view_count: first_count(media, VIEW_COUNT_PATHS),
        like_count: first_count(media, LIKE_COUNT_PATHS),
        comment_count: first_count(media, COMMENT_COUNT_PATHS),
        posted_at: posted_at(media),
        last_checked: checked_at.to_string(),
    })
}

/// Builds reel rows from the items of a reels response. Items without a
/// resolvable media payload or reel id are skipped and counted, never raised.
pub fn extract_reels(items: &[Value], owner_handle: &str, checked_at: &str) -> ReelBatch {
    let mut batch = ReelBatch::default();
    for item in items {
        let Some(media) = media_payload(item) else {
            warn!(handle = owner_handle, "no media object in reel item, skipping");
            batch.skipped += 1;
            continue;
        };
        match extract_reel(media, owner_handle, checked_at) {
            Some(reel) => batch.reels.push(reel),
            None => {
                warn!(handle = owner_handle, "no reel ID found, skipping item");
                batch.skipped += 1;
            }
        }
    }
    debug!(
        handle = owner_handle,
        extracted = batch.reels.len(),
        skipped = batch.skipped,
        "reels extracted"
    );
    batch
}
