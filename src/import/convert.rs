//! Field conversions shared by the import stages.

use super::markdown::convert_markdown;
use crate::db::Record;
use crate::error::{ImportError, ImportResult};
use crate::types::{CommentTarget, LegacyAppUser, LegacyMember, User};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;

/// Format an epoch timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_datetime(epoch: i64) -> ImportResult<String> {
    to_datetime(epoch).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Format an epoch timestamp as `YYYY-MM-DD` (UTC).
pub fn format_date(epoch: i64) -> ImportResult<String> {
    to_datetime(epoch).map(|dt| dt.format("%Y-%m-%d").to_string())
}

fn to_datetime(epoch: i64) -> ImportResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(epoch, 0).ok_or(ImportError::InvalidTimestamp(epoch))
}

/// Split a comma-delimited tag string into trimmed, unique names, keeping
/// the first occurrence of each.
pub fn split_tags(tags: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in tags.unwrap_or_default().split(',').map(str::trim) {
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Tagged password hash understood by the site's legacy login:
/// `LEGACYSHA:<hash>` for converted passwords, else
/// `LEGACYMD5:<hash>:<salt>`, else empty.
pub fn legacy_password_hash(member: &LegacyMember) -> String {
    if let Some(sha) = non_empty(&member.conv_password) {
        return format!("LEGACYSHA:{}", sha);
    }
    match (non_empty(&member.pass_hash), non_empty(&member.pass_salt)) {
        (Some(hash), Some(salt)) => format!("LEGACYMD5:{}:{}", hash, salt),
        _ => String::new(),
    }
}

/// Build the site user. Enrichment fields stay empty without a
/// cross-reference record.
pub fn build_user(member: &LegacyMember, app_user: Option<&LegacyAppUser>) -> ImportResult<User> {
    let login_time = app_user
        .and_then(|u| u.login_time)
        .map(format_datetime)
        .transpose()?;

    Ok(User {
        id: member.id,
        username: member.name.clone(),
        email: member.email.clone(),
        display_name: non_empty(&member.display_name)
            .unwrap_or(member.name.as_str())
            .to_string(),
        password_hash: legacy_password_hash(member),
        created_at: format_datetime(member.joined)?,
        login_time,
        rank: app_user.and_then(|u| u.rank),
        rating: app_user.and_then(|u| u.rating),
        extension_count: app_user.and_then(|u| u.extension_count),
        wiki_count: app_user.and_then(|u| u.wiki_count),
        comment_count: app_user.and_then(|u| u.comment_count),
        post_count: app_user.and_then(|u| u.post_count),
    })
}

/// Map a legacy comment object type to the site's. Identity for every
/// known kind; this is the single place to remap them.
pub fn convert_comment_type(object_type: &str) -> CommentTarget {
    CommentTarget::parse(object_type)
}

/// Comment text: a `####` heading for the title when there is one,
/// followed by the converted body.
pub fn comment_text(title: Option<&str>, content: &str) -> String {
    let body = convert_markdown(content);
    match title.filter(|t| !t.is_empty()) {
        Some(title) => format!("#### {}\n\n{}", title, body),
        None => body,
    }
}

/// Replace the epoch `create_time` column with a formatted `created_at`.
/// A NULL `create_time` becomes a NULL `created_at`.
pub fn convert_create_time(mut record: Record) -> ImportResult<Record> {
    let created_at = match record.epoch("create_time")? {
        Some(epoch) => Value::Text(format_datetime(epoch)?),
        None => Value::Null,
    };
    record.take("create_time");
    record.set("created_at", created_at);
    Ok(record)
}

/// Format the named epoch columns in place, leaving NULLs alone.
pub fn format_epoch_columns(mut record: Record, columns: &[&str]) -> ImportResult<Record> {
    for column in columns {
        if let Some(epoch) = record.epoch(column)? {
            record.set(column, Value::Text(format_datetime(epoch)?));
        }
    }
    Ok(record)
}
