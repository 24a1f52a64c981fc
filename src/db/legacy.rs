//! Read-only queries against the legacy forum/wiki schema.

use super::{Database, Record, quote_ident};
use crate::error::{ImportError, ImportResult};
use crate::types::{
    LegacyAppUser, LegacyComment, LegacyMember, LegacyNews, LegacyWikiCategory, LegacyWikiPage,
    LegacyWikiRevision,
};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashSet;
use std::path::Path;

/// Legacy source database.
pub struct LegacyDb {
    db: Database,
}

impl LegacyDb {
    /// Open the legacy dump read-only.
    pub fn open<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<Self> {
        Ok(Self {
            db: Database::open_read_only(path, password)?,
        })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// Total rows of a legacy table.
    pub fn count(&self, table: &str) -> Result<i64> {
        self.db.count(table)
    }

    /// Accounts that are not banned.
    pub fn count_members(&self) -> Result<i64> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM ipb_members WHERE member_banned = 0",
                [],
                |row| row.get(0),
            )
            .context("failed to count ipb_members")
        })
    }

    /// Emails shared by more than one account.
    pub fn duplicate_emails(&self) -> Result<HashSet<String>> {
        self.duplicates("email")
    }

    /// Usernames shared by more than one account.
    pub fn duplicate_usernames(&self) -> Result<HashSet<String>> {
        self.duplicates("name")
    }

    fn duplicates(&self, column: &str) -> Result<HashSet<String>> {
        let column = quote_ident(column)?;
        let sql = format!(
            "SELECT {column} FROM ipb_members GROUP BY {column} HAVING COUNT(*) > 1"
        );
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let values = stmt
                .query_map([], |row| row.get::<_, Option<String>>(0))?
                .filter_map(|value| value.transpose())
                .collect::<rusqlite::Result<HashSet<String>>>()?;
            Ok(values)
        })
    }

    /// Non-banned accounts, paged by `batch_size`. Decode each row with
    /// `LegacyMember::try_from`.
    pub fn members(&self, batch_size: usize) -> Paged<'_> {
        self.paged(
            "ipb_members",
            "SELECT member_id AS id, name, email, joined, last_visit, last_activity,
                    members_display_name AS display_name, members_pass_hash AS pass_hash,
                    members_pass_salt AS pass_salt, conv_password
             FROM ipb_members WHERE member_banned = 0 ORDER BY member_id",
            batch_size,
        )
    }

    /// Cross-reference account from `tbl_user` with the same id.
    pub fn app_user(&self, id: i64) -> Result<Option<LegacyAppUser>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, login_time, rank, rating, extension_count,
                        wiki_count, comment_count, post_count
                 FROM tbl_user WHERE id = ?1",
                params![id],
                |row| {
                    Ok(LegacyAppUser {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        login_time: row.get(2)?,
                        rank: row.get(3)?,
                        rating: row.get(4)?,
                        extension_count: row.get(5)?,
                        wiki_count: row.get(6)?,
                        comment_count: row.get(7)?,
                        post_count: row.get(8)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("failed to read tbl_user #{}", id))
        })
    }

    /// Every column of `table`, in storage order, paged by `batch_size`.
    pub fn records<'a>(&'a self, table: &'a str, batch_size: usize) -> Result<Paged<'a>> {
        let sql = format!("SELECT * FROM {} ORDER BY rowid", quote_ident(table)?);
        Ok(self.paged(table, &sql, batch_size))
    }

    pub fn wiki_categories(&self) -> Result<Vec<LegacyWikiCategory>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT code, name, sequence FROM tbl_lookup
                 WHERE type = 'WikiCategory' ORDER BY sequence, code",
            )?;
            let categories = stmt
                .query_map([], |row| {
                    Ok(LegacyWikiCategory {
                        code: row.get(0)?,
                        name: row.get(1)?,
                        sequence: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(categories)
        })
    }

    pub fn wiki_pages(&self, batch_size: usize) -> Paged<'_> {
        self.paged(
            "tbl_wiki",
            "SELECT id, title, content, category_id, tags, creator_id, updater_id,
                    create_time, update_time, yii_version, total_votes, up_votes, rating,
                    view_count, comment_count, status, featured
             FROM tbl_wiki ORDER BY id",
            batch_size,
        )
    }

    /// All revisions of one page, oldest first, still undecoded.
    pub fn wiki_revisions(&self, wiki_id: i64) -> Result<Vec<Record>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT wiki_id, revision, title, content, tags, category_id, memo,
                        updater_id, update_time
                 FROM tbl_wiki_revision WHERE wiki_id = ?1 ORDER BY revision",
            )?;
            let revisions = stmt
                .query_map(params![wiki_id], |row| {
                    Record::from_row("tbl_wiki_revision", row)
                })?
                .collect::<rusqlite::Result<Vec<_>>>()
                .with_context(|| format!("failed to read revisions of wiki #{}", wiki_id))?;
            Ok(revisions)
        })
    }

    pub fn comments(&self, batch_size: usize) -> Paged<'_> {
        self.paged(
            "tbl_comment",
            "SELECT id, creator_id, object_type, object_id, title, content, create_time,
                    update_time, total_votes, up_votes, rating, status
             FROM tbl_comment ORDER BY id",
            batch_size,
        )
    }

    pub fn news(&self, batch_size: usize) -> Paged<'_> {
        self.paged(
            "tbl_news",
            "SELECT id, title, content, news_date, status, creator_id, create_time,
                    updater_id, update_time, tags
             FROM tbl_news ORDER BY id",
            batch_size,
        )
    }

    fn paged<'a>(&'a self, table: &'a str, sql: &str, batch_size: usize) -> Paged<'a> {
        Paged {
            conn: &self.db.conn,
            table,
            sql: format!("{} LIMIT ?1 OFFSET ?2", sql),
            batch_size: batch_size.max(1),
            offset: 0,
            buffer: Vec::new().into_iter(),
            exhausted: false,
        }
    }
}

/// Iterator over a query, fetching `batch_size` rows per round trip.
///
/// Rows come back as [`Record`]s so a badly typed column never fails the
/// page. Only a failing query ends the iteration, after yielding the error.
pub struct Paged<'a> {
    conn: &'a Connection,
    table: &'a str,
    sql: String,
    batch_size: usize,
    offset: usize,
    buffer: std::vec::IntoIter<Record>,
    exhausted: bool,
}

impl Paged<'_> {
    fn fetch_page(&self) -> rusqlite::Result<Vec<Record>> {
        let mut stmt = self.conn.prepare_cached(&self.sql)?;
        let rows = stmt
            .query_map(
                params![self.batch_size as i64, self.offset as i64],
                |row| Record::from_row(self.table, row),
            )?
            .collect::<rusqlite::Result<Vec<Record>>>()?;
        Ok(rows)
    }
}

impl Iterator for Paged<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.buffer.next() {
            return Some(Ok(item));
        }
        if self.exhausted {
            return None;
        }

        match self.fetch_page() {
            Ok(rows) => {
                if rows.len() < self.batch_size {
                    self.exhausted = true;
                }
                self.offset += rows.len();
                self.buffer = rows.into_iter();
                self.buffer.next().map(Ok)
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(anyhow::Error::new(err).context("failed to read legacy rows")))
            }
        }
    }
}

// ============================================================================
// Row decoding
// ============================================================================

impl TryFrom<&Record> for LegacyMember {
    type Error = ImportError;

    fn try_from(row: &Record) -> ImportResult<Self> {
        Ok(Self {
            id: row.int("id")?,
            name: row.text("name")?,
            email: row.text("email")?,
            joined: row.timestamp("joined")?,
            last_visit: row.epoch("last_visit")?,
            last_activity: row.epoch("last_activity")?,
            display_name: row.opt_text("display_name")?,
            pass_hash: row.opt_text("pass_hash")?,
            pass_salt: row.opt_text("pass_salt")?,
            conv_password: row.opt_text("conv_password")?,
        })
    }
}

impl TryFrom<&Record> for LegacyWikiPage {
    type Error = ImportError;

    fn try_from(row: &Record) -> ImportResult<Self> {
        Ok(Self {
            id: row.int("id")?,
            title: row.text("title")?,
            content: row.text("content")?,
            category_id: row.opt_int("category_id")?,
            tags: row.opt_text("tags")?,
            creator_id: row.opt_int("creator_id")?,
            updater_id: row.opt_int("updater_id")?,
            create_time: row.timestamp("create_time")?,
            update_time: row.timestamp("update_time")?,
            yii_version: row.opt_text("yii_version")?,
            total_votes: row.int("total_votes")?,
            up_votes: row.int("up_votes")?,
            rating: row.real("rating")?,
            view_count: row.int("view_count")?,
            comment_count: row.int("comment_count")?,
            status: row.int("status")?,
            featured: row.int("featured")?,
        })
    }
}

impl TryFrom<&Record> for LegacyWikiRevision {
    type Error = ImportError;

    fn try_from(row: &Record) -> ImportResult<Self> {
        Ok(Self {
            wiki_id: row.int("wiki_id")?,
            revision: row.int("revision")?,
            title: row.text("title")?,
            content: row.text("content")?,
            tags: row.opt_text("tags")?,
            category_id: row.opt_int("category_id")?,
            memo: row.opt_text("memo")?,
            updater_id: row.opt_int("updater_id")?,
            update_time: row.timestamp("update_time")?,
        })
    }
}

impl TryFrom<&Record> for LegacyComment {
    type Error = ImportError;

    fn try_from(row: &Record) -> ImportResult<Self> {
        Ok(Self {
            id: row.int("id")?,
            creator_id: row.opt_int("creator_id")?,
            object_type: row.text("object_type")?,
            object_id: row.int("object_id")?,
            title: row.opt_text("title")?,
            content: row.text("content")?,
            create_time: row.timestamp("create_time")?,
            update_time: row.timestamp("update_time")?,
            total_votes: row.int("total_votes")?,
            up_votes: row.int("up_votes")?,
            rating: row.real("rating")?,
            status: row.int("status")?,
        })
    }
}

impl TryFrom<&Record> for LegacyNews {
    type Error = ImportError;

    fn try_from(row: &Record) -> ImportResult<Self> {
        Ok(Self {
            id: row.int("id")?,
            title: row.text("title")?,
            content: row.text("content")?,
            news_date: row.timestamp("news_date")?,
            status: row.int("status")?,
            creator_id: row.opt_int("creator_id")?,
            create_time: row.timestamp("create_time")?,
            updater_id: row.opt_int("updater_id")?,
            update_time: row.timestamp("update_time")?,
            tags: row.opt_text("tags")?,
        })
    }
}
