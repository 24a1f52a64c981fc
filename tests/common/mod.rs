//! Shared fixtures: legacy and site schemas in temporary SQLite files.

#![allow(dead_code)]

use legacy_importer::db::{LegacyDb, SiteDb};
use legacy_importer::import::{ImportOptions, Importer};
use rusqlite::{Connection, params};
use std::path::PathBuf;
use tempfile::TempDir;

pub const LEGACY_SCHEMA: &str = r#"
CREATE TABLE ipb_members (
    member_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    joined INTEGER NOT NULL,
    last_visit INTEGER,
    last_activity INTEGER,
    members_display_name TEXT,
    members_pass_hash TEXT,
    members_pass_salt TEXT,
    conv_password TEXT,
    member_banned INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE tbl_user (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL,
    login_time INTEGER,
    rank INTEGER,
    rating INTEGER,
    extension_count INTEGER,
    wiki_count INTEGER,
    comment_count INTEGER,
    post_count INTEGER
);
CREATE TABLE tbl_badge (
    id INTEGER PRIMARY KEY,
    urlname TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    achieved INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE tbl_user_badge (
    user_id INTEGER NOT NULL,
    badge_id INTEGER NOT NULL,
    create_time INTEGER,
    complete_time INTEGER,
    progress INTEGER
);
CREATE TABLE tbl_badge_queue (
    id INTEGER PRIMARY KEY,
    badge_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    progress INTEGER
);
CREATE TABLE tbl_lookup (
    id INTEGER PRIMARY KEY,
    type TEXT NOT NULL,
    code INTEGER NOT NULL,
    name TEXT NOT NULL,
    sequence INTEGER NOT NULL
);
CREATE TABLE tbl_wiki (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    category_id INTEGER,
    tags TEXT,
    creator_id INTEGER,
    updater_id INTEGER,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL,
    yii_version TEXT,
    total_votes INTEGER NOT NULL DEFAULT 0,
    up_votes INTEGER NOT NULL DEFAULT 0,
    rating REAL NOT NULL DEFAULT 0,
    view_count INTEGER NOT NULL DEFAULT 0,
    comment_count INTEGER NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 3,
    featured INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE tbl_wiki_revision (
    wiki_id INTEGER NOT NULL,
    revision INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    tags TEXT,
    category_id INTEGER,
    memo TEXT,
    updater_id INTEGER,
    update_time INTEGER NOT NULL
);
CREATE TABLE tbl_comment (
    id INTEGER PRIMARY KEY,
    creator_id INTEGER,
    object_type TEXT NOT NULL,
    object_id INTEGER NOT NULL,
    title TEXT,
    content TEXT,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL,
    total_votes INTEGER NOT NULL DEFAULT 0,
    up_votes INTEGER NOT NULL DEFAULT 0,
    rating REAL NOT NULL DEFAULT 0,
    status INTEGER NOT NULL
);
CREATE TABLE tbl_news (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    news_date INTEGER NOT NULL,
    status INTEGER NOT NULL,
    creator_id INTEGER,
    create_time INTEGER NOT NULL,
    updater_id INTEGER,
    update_time INTEGER NOT NULL,
    tags TEXT
);
CREATE TABLE tbl_rating (
    user_id INTEGER NOT NULL,
    object_type TEXT NOT NULL,
    object_id INTEGER NOT NULL,
    rating INTEGER NOT NULL,
    create_time INTEGER
);
CREATE TABLE tbl_star (
    user_id INTEGER NOT NULL,
    object_type TEXT NOT NULL,
    object_id INTEGER NOT NULL,
    star INTEGER NOT NULL,
    create_time INTEGER
);
"#;

pub const SITE_SCHEMA: &str = r#"
CREATE TABLE "user" (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    login_time TEXT,
    rank INTEGER,
    rating INTEGER,
    extension_count INTEGER,
    wiki_count INTEGER,
    comment_count INTEGER,
    post_count INTEGER
);
CREATE TABLE badges (
    id INTEGER PRIMARY KEY,
    urlname TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    achieved INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE user_badges (
    user_id INTEGER NOT NULL,
    badge_id INTEGER NOT NULL,
    create_time TEXT,
    complete_time TEXT,
    progress INTEGER,
    PRIMARY KEY (user_id, badge_id)
);
CREATE TABLE badge_queue (
    id INTEGER PRIMARY KEY,
    badge_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    progress INTEGER
);
CREATE TABLE wiki_categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    sequence INTEGER NOT NULL
);
CREATE TABLE wiki (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    category_id INTEGER,
    creator_id INTEGER,
    updater_id INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    yii_version TEXT,
    total_votes INTEGER NOT NULL,
    up_votes INTEGER NOT NULL,
    rating REAL NOT NULL,
    view_count INTEGER NOT NULL,
    comment_count INTEGER NOT NULL,
    status INTEGER NOT NULL,
    featured INTEGER NOT NULL
);
CREATE TABLE wiki_revision (
    wiki_id INTEGER NOT NULL,
    revision INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    tag_names TEXT,
    category_id INTEGER,
    memo TEXT NOT NULL,
    updater_id INTEGER,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (wiki_id, revision)
);
CREATE TABLE comment (
    id INTEGER PRIMARY KEY,
    user_id INTEGER,
    object_type TEXT NOT NULL,
    object_id INTEGER NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    total_votes INTEGER NOT NULL,
    up_votes INTEGER NOT NULL,
    rating REAL NOT NULL,
    status INTEGER NOT NULL
);
CREATE TABLE news (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    news_date TEXT NOT NULL,
    content TEXT NOT NULL,
    status INTEGER NOT NULL,
    creator_id INTEGER,
    created_at TEXT NOT NULL,
    updater_id INTEGER,
    updated_at TEXT NOT NULL
);
CREATE TABLE rating (
    user_id INTEGER NOT NULL,
    object_type TEXT NOT NULL,
    object_id INTEGER NOT NULL,
    rating INTEGER NOT NULL,
    created_at TEXT,
    PRIMARY KEY (user_id, object_type, object_id)
);
CREATE TABLE star (
    user_id INTEGER NOT NULL,
    object_type TEXT NOT NULL,
    object_id INTEGER NOT NULL,
    star INTEGER NOT NULL,
    created_at TEXT,
    PRIMARY KEY (user_id, object_type, object_id)
);
CREATE TABLE wiki_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    frequency INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE wiki2wiki_tags (
    wiki_id INTEGER NOT NULL,
    wiki_tag_id INTEGER NOT NULL,
    PRIMARY KEY (wiki_id, wiki_tag_id)
);
CREATE TABLE news_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    frequency INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE news2news_tags (
    news_id INTEGER NOT NULL,
    news_tag_id INTEGER NOT NULL,
    PRIMARY KEY (news_id, news_tag_id)
);
"#;

/// A legacy dump and an empty site database in a temporary directory.
pub struct Fixture {
    _dir: TempDir,
    pub source_path: PathBuf,
    pub site_path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source_path = dir.path().join("legacy.db");
        let site_path = dir.path().join("site.db");

        Connection::open(&source_path)
            .and_then(|conn| conn.execute_batch(LEGACY_SCHEMA))
            .expect("Failed to create legacy schema");
        Connection::open(&site_path)
            .and_then(|conn| conn.execute_batch(SITE_SCHEMA))
            .expect("Failed to create site schema");

        Self {
            _dir: dir,
            source_path,
            site_path,
        }
    }

    /// Writable connection to the legacy dump, for seeding.
    pub fn source(&self) -> Connection {
        Connection::open(&self.source_path).expect("Failed to open legacy db")
    }

    /// Connection to the site database, for assertions.
    pub fn site(&self) -> Connection {
        Connection::open(&self.site_path).expect("Failed to open site db")
    }

    pub fn importer(&self) -> Importer {
        self.importer_with(ImportOptions::default())
    }

    pub fn importer_with(&self, options: ImportOptions) -> Importer {
        let source = LegacyDb::open(&self.source_path, None).expect("Failed to open source");
        let site = SiteDb::open(&self.site_path, "").expect("Failed to open destination");
        Importer::new(source, site, options)
    }

    pub fn count(&self, table: &str) -> i64 {
        self.site()
            .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| {
                row.get(0)
            })
            .expect("Failed to count rows")
    }
}

pub fn add_member(conn: &Connection, id: i64, name: &str, email: &str) {
    conn.execute(
        "INSERT INTO ipb_members (member_id, name, email, joined, members_display_name,
                                  members_pass_hash, members_pass_salt)
         VALUES (?1, ?2, ?3, 1700000000, ?2, 'md5hash', 'salt')",
        params![id, name, email],
    )
    .expect("Failed to insert member");
}

pub fn add_app_user(conn: &Connection, id: i64, username: &str) {
    conn.execute(
        "INSERT INTO tbl_user (id, username, login_time, rank, rating, extension_count,
                               wiki_count, comment_count, post_count)
         VALUES (?1, ?2, 1700000100, 1, 10, 2, 3, 4, 5)",
        params![id, username],
    )
    .expect("Failed to insert tbl_user row");
}

/// Member with a matching cross-reference row.
pub fn add_user(conn: &Connection, id: i64, name: &str, email: &str) {
    add_member(conn, id, name, email);
    add_app_user(conn, id, name);
}

pub fn add_wiki_page(conn: &Connection, id: i64, title: &str, tags: &str) {
    conn.execute(
        "INSERT INTO tbl_wiki (id, title, content, category_id, tags, creator_id, updater_id,
                               create_time, update_time)
         VALUES (?1, ?2, 'Body of ' || ?2, 1, ?3, 1, 1, 1700000000, 1700000500)",
        params![id, title, tags],
    )
    .expect("Failed to insert wiki page");
}

pub fn add_wiki_revision(conn: &Connection, wiki_id: i64, revision: i64, memo: Option<&str>) {
    conn.execute(
        "INSERT INTO tbl_wiki_revision (wiki_id, revision, title, content, tags, category_id,
                                        memo, updater_id, update_time)
         VALUES (?1, ?2, 'Rev ' || ?2, '~~~[php]\necho 1;\n~~~', 'a, b', 1, ?3, 1, 1700000000)",
        params![wiki_id, revision, memo],
    )
    .expect("Failed to insert wiki revision");
}

pub fn add_comment(conn: &Connection, id: i64, title: Option<&str>, status: i64) {
    conn.execute(
        "INSERT INTO tbl_comment (id, creator_id, object_type, object_id, title, content,
                                  create_time, update_time, status)
         VALUES (?1, 1, 'Wiki', 10, ?2, 'Comment text', 1700000000, 1700000000, ?3)",
        params![id, title, status],
    )
    .expect("Failed to insert comment");
}

pub fn add_news(conn: &Connection, id: i64, status: i64, tags: Option<&str>) {
    conn.execute(
        "INSERT INTO tbl_news (id, title, content, news_date, status, creator_id, create_time,
                               updater_id, update_time, tags)
         VALUES (?1, 'News ' || ?1, 'Released.', 1700000000, ?2, 1, 1700000000, 1,
                 1700000000, ?3)",
        params![id, status, tags],
    )
    .expect("Failed to insert news");
}
