//! Core types: legacy source records, site destination records and the
//! status enumerations that map between them.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Status mappings
// ============================================================================

/// Publication status of site content (news, wiki).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Deleted,
}

impl ContentStatus {
    /// Value stored in the site's `status` column.
    pub fn as_db(self) -> i64 {
        match self {
            ContentStatus::Draft => 1,
            ContentStatus::Published => 2,
            ContentStatus::Deleted => 3,
        }
    }

    /// Map a legacy news status (1 draft, 2 pending, 3 published,
    /// 4 archived, 5 deleted). Returns `None` outside that range.
    pub fn from_legacy_news(status: i64) -> Option<Self> {
        match status {
            1 | 2 => Some(ContentStatus::Draft),
            3 | 4 => Some(ContentStatus::Published),
            5 => Some(ContentStatus::Deleted),
            _ => None,
        }
    }
}

/// Visibility of a comment on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Active,
    Deleted,
}

impl CommentStatus {
    pub fn as_db(self) -> i64 {
        match self {
            CommentStatus::Active => 10,
            CommentStatus::Deleted => 0,
        }
    }

    /// Only approved legacy comments (status 3) stay visible.
    pub fn from_legacy(status: i64) -> Self {
        if status == 3 {
            CommentStatus::Active
        } else {
            CommentStatus::Deleted
        }
    }
}

/// Kind of object a comment is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentTarget {
    Wiki,
    Extension,
    News,
    /// Any object type the site does not know by name.
    Other(String),
}

impl CommentTarget {
    pub fn parse(object_type: &str) -> Self {
        match object_type {
            "Wiki" => CommentTarget::Wiki,
            "Extension" => CommentTarget::Extension,
            "News" => CommentTarget::News,
            other => CommentTarget::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CommentTarget::Wiki => "Wiki",
            CommentTarget::Extension => "Extension",
            CommentTarget::News => "News",
            CommentTarget::Other(name) => name,
        }
    }
}

impl fmt::Display for CommentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Legacy records
// ============================================================================

/// Forum account from `ipb_members`.
#[derive(Debug, Clone, Default)]
pub struct LegacyMember {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub joined: i64,
    pub last_visit: Option<i64>,
    pub last_activity: Option<i64>,
    pub display_name: Option<String>,
    pub pass_hash: Option<String>,
    pub pass_salt: Option<String>,
    pub conv_password: Option<String>,
}

/// Cross-reference account from the intermediate `tbl_user` table.
#[derive(Debug, Clone, Default)]
pub struct LegacyAppUser {
    pub id: i64,
    pub username: String,
    pub login_time: Option<i64>,
    pub rank: Option<i64>,
    pub rating: Option<i64>,
    pub extension_count: Option<i64>,
    pub wiki_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub post_count: Option<i64>,
}

/// Wiki category stored as a `tbl_lookup` row.
#[derive(Debug, Clone)]
pub struct LegacyWikiCategory {
    pub code: i64,
    pub name: String,
    pub sequence: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LegacyWikiPage {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub tags: Option<String>,
    pub creator_id: Option<i64>,
    pub updater_id: Option<i64>,
    pub create_time: i64,
    pub update_time: i64,
    pub yii_version: Option<String>,
    pub total_votes: i64,
    pub up_votes: i64,
    pub rating: f64,
    pub view_count: i64,
    pub comment_count: i64,
    pub status: i64,
    pub featured: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LegacyWikiRevision {
    pub wiki_id: i64,
    pub revision: i64,
    pub title: String,
    pub content: String,
    pub tags: Option<String>,
    pub category_id: Option<i64>,
    pub memo: Option<String>,
    pub updater_id: Option<i64>,
    pub update_time: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LegacyComment {
    pub id: i64,
    pub creator_id: Option<i64>,
    pub object_type: String,
    pub object_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub create_time: i64,
    pub update_time: i64,
    pub total_votes: i64,
    pub up_votes: i64,
    pub rating: f64,
    pub status: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LegacyNews {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub news_date: i64,
    pub status: i64,
    pub creator_id: Option<i64>,
    pub create_time: i64,
    pub updater_id: Option<i64>,
    pub update_time: i64,
    pub tags: Option<String>,
}

// ============================================================================
// Site records
// ============================================================================

/// Row for the site `user` table.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: String,
    pub login_time: Option<String>,
    pub rank: Option<i64>,
    pub rating: Option<i64>,
    pub extension_count: Option<i64>,
    pub wiki_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub post_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WikiCategory {
    pub id: i64,
    pub name: String,
    pub sequence: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wiki {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub tag_names: Vec<String>,
    pub creator_id: Option<i64>,
    pub updater_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub yii_version: Option<String>,
    pub total_votes: i64,
    pub up_votes: i64,
    pub rating: f64,
    pub view_count: i64,
    pub comment_count: i64,
    pub status: i64,
    pub featured: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WikiRevision {
    pub wiki_id: i64,
    pub revision: i64,
    pub title: String,
    pub content: String,
    pub tag_names: Vec<String>,
    pub category_id: Option<i64>,
    pub memo: String,
    pub updater_id: Option<i64>,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub user_id: Option<i64>,
    pub object_type: CommentTarget,
    pub object_id: i64,
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
    pub total_votes: i64,
    pub up_votes: i64,
    pub rating: f64,
    pub status: CommentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub news_date: String,
    pub content: String,
    pub status: ContentStatus,
    pub creator_id: Option<i64>,
    pub created_at: String,
    pub updater_id: Option<i64>,
    pub updated_at: String,
    pub tag_names: Vec<String>,
}
