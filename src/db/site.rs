//! Writes into the site schema.
//!
//! Every insert is a single parameterized statement running in its own
//! implicit transaction; nothing here wraps several rows together.

use super::{Database, Record, quote_ident};
use crate::types::{Comment, News, User, Wiki, WikiCategory, WikiRevision};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;

/// Content kinds with their own tag tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Wiki,
    News,
}

impl TagKind {
    fn name(self) -> &'static str {
        match self {
            TagKind::Wiki => "wiki",
            TagKind::News => "news",
        }
    }
}

/// Site destination database.
pub struct SiteDb {
    db: Database,
    table_prefix: String,
}

impl SiteDb {
    pub fn open<P: AsRef<Path>>(path: P, table_prefix: &str) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?, table_prefix))
    }

    pub fn from_database(db: Database, table_prefix: &str) -> Self {
        Self {
            db,
            table_prefix: table_prefix.to_string(),
        }
    }

    /// Table name with the configured prefix applied.
    pub fn table(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix, name)
    }

    fn quoted(&self, name: &str) -> Result<String> {
        Ok(quote_ident(&self.table(name))?)
    }

    pub fn count(&self, table: &str) -> Result<i64> {
        self.db.count(&self.table(table))
    }

    /// Whether the table already holds at least one row.
    pub fn is_populated(&self, table: &str) -> Result<bool> {
        Ok(self.count(table)? > 0)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        self.db.with_conn(f)
    }

    /// Insert every column of `record` into `table` unchanged.
    pub fn insert_record(&self, table: &str, record: &Record) -> Result<()> {
        let columns = record
            .columns()
            .map(quote_ident)
            .collect::<Result<Vec<_>, _>>()?;
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quoted(table)?,
            columns.join(", "),
            placeholders.join(", ")
        );
        self.db.with_conn(|conn| {
            conn.execute(&sql, params_from_iter(record.values()))
                .with_context(|| format!("failed to insert into {}", self.table(table)))?;
            Ok(())
        })
    }

    pub fn insert_user(&self, user: &User) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (id, username, email, display_name, password_hash, created_at,
                             login_time, rank, rating, extension_count, wiki_count,
                             comment_count, post_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            self.quoted("user")?
        );
        self.db.with_conn(|conn| {
            conn.execute(
                &sql,
                params![
                    user.id,
                    user.username,
                    user.email,
                    user.display_name,
                    user.password_hash,
                    user.created_at,
                    user.login_time,
                    user.rank,
                    user.rating,
                    user.extension_count,
                    user.wiki_count,
                    user.comment_count,
                    user.post_count,
                ],
            )
            .with_context(|| format!("failed to insert user #{}", user.id))?;
            Ok(())
        })
    }

    pub fn insert_wiki_category(&self, category: &WikiCategory) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (id, name, sequence) VALUES (?1, ?2, ?3)",
            self.quoted("wiki_categories")?
        );
        self.db.with_conn(|conn| {
            conn.execute(&sql, params![category.id, category.name, category.sequence])
                .with_context(|| format!("failed to insert wiki category #{}", category.id))?;
            Ok(())
        })
    }

    /// Insert a page and link its tags.
    pub fn insert_wiki(&self, wiki: &Wiki) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (id, title, content, category_id, creator_id, updater_id,
                             created_at, updated_at, yii_version, total_votes, up_votes,
                             rating, view_count, comment_count, status, featured)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            self.quoted("wiki")?
        );
        self.db.with_conn(|conn| {
            conn.execute(
                &sql,
                params![
                    wiki.id,
                    wiki.title,
                    wiki.content,
                    wiki.category_id,
                    wiki.creator_id,
                    wiki.updater_id,
                    wiki.created_at,
                    wiki.updated_at,
                    wiki.yii_version,
                    wiki.total_votes,
                    wiki.up_votes,
                    wiki.rating,
                    wiki.view_count,
                    wiki.comment_count,
                    wiki.status,
                    wiki.featured,
                ],
            )
            .with_context(|| format!("failed to insert wiki #{}", wiki.id))?;
            Ok(())
        })?;
        self.link_tags(TagKind::Wiki, wiki.id, &wiki.tag_names)
    }

    /// Remove every stored revision of a page. Returns the number removed.
    pub fn delete_wiki_revisions(&self, wiki_id: i64) -> Result<usize> {
        let sql = format!(
            "DELETE FROM {} WHERE wiki_id = ?1",
            self.quoted("wiki_revision")?
        );
        self.db.with_conn(|conn| {
            conn.execute(&sql, params![wiki_id])
                .with_context(|| format!("failed to clear revisions of wiki #{}", wiki_id))
        })
    }

    pub fn insert_wiki_revision(&self, revision: &WikiRevision) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (wiki_id, revision, title, content, tag_names, category_id,
                             memo, updater_id, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            self.quoted("wiki_revision")?
        );
        self.db.with_conn(|conn| {
            conn.execute(
                &sql,
                params![
                    revision.wiki_id,
                    revision.revision,
                    revision.title,
                    revision.content,
                    revision.tag_names.join(", "),
                    revision.category_id,
                    revision.memo,
                    revision.updater_id,
                    revision.updated_at,
                ],
            )
            .with_context(|| {
                format!(
                    "failed to insert revision {} of wiki #{}",
                    revision.revision, revision.wiki_id
                )
            })?;
            Ok(())
        })
    }

    pub fn insert_comment(&self, comment: &Comment) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (id, user_id, object_type, object_id, text, created_at,
                             updated_at, total_votes, up_votes, rating, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            self.quoted("comment")?
        );
        self.db.with_conn(|conn| {
            conn.execute(
                &sql,
                params![
                    comment.id,
                    comment.user_id,
                    comment.object_type.as_str(),
                    comment.object_id,
                    comment.text,
                    comment.created_at,
                    comment.updated_at,
                    comment.total_votes,
                    comment.up_votes,
                    comment.rating,
                    comment.status.as_db(),
                ],
            )
            .with_context(|| format!("failed to insert comment #{}", comment.id))?;
            Ok(())
        })
    }

    /// Insert a news item and link its tags.
    pub fn insert_news(&self, news: &News) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (id, title, news_date, content, status, creator_id, created_at,
                             updater_id, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            self.quoted("news")?
        );
        self.db.with_conn(|conn| {
            conn.execute(
                &sql,
                params![
                    news.id,
                    news.title,
                    news.news_date,
                    news.content,
                    news.status.as_db(),
                    news.creator_id,
                    news.created_at,
                    news.updater_id,
                    news.updated_at,
                ],
            )
            .with_context(|| format!("failed to insert news #{}", news.id))?;
            Ok(())
        })?;
        self.link_tags(TagKind::News, news.id, &news.tag_names)
    }

    /// Attach tags to an object, creating tag rows on first use and bumping
    /// their frequency on every link.
    pub fn link_tags(&self, kind: TagKind, object_id: i64, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let tags = self.quoted(&format!("{}_tags", kind.name()))?;
        let link = self.quoted(&format!("{0}2{0}_tags", kind.name()))?;
        let object_col = format!("{}_id", kind.name());
        let tag_col = format!("{}_tag_id", kind.name());

        self.db.with_conn(|conn| {
            for name in names {
                let existing: Option<i64> = conn
                    .query_row(
                        &format!("SELECT id FROM {} WHERE name = ?1", tags),
                        params![name],
                        |row| row.get(0),
                    )
                    .optional()?;
                let tag_id = match existing {
                    Some(id) => id,
                    None => {
                        conn.execute(
                            &format!("INSERT INTO {} (name, frequency) VALUES (?1, 0)", tags),
                            params![name],
                        )?;
                        conn.last_insert_rowid()
                    }
                };
                conn.execute(
                    &format!("UPDATE {} SET frequency = frequency + 1 WHERE id = ?1", tags),
                    params![tag_id],
                )?;
                conn.execute(
                    &format!(
                        "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
                        link, object_col, tag_col
                    ),
                    params![object_id, tag_id],
                )
                .with_context(|| format!("failed to tag {} #{} with {}", kind.name(), object_id, name))?;
            }
            Ok(())
        })
    }

    /// Tag names linked to an object, in link order.
    pub fn tags_of(&self, kind: TagKind, object_id: i64) -> Result<Vec<String>> {
        let tags = self.quoted(&format!("{}_tags", kind.name()))?;
        let link = self.quoted(&format!("{0}2{0}_tags", kind.name()))?;
        let sql = format!(
            "SELECT t.name FROM {link} l JOIN {tags} t ON t.id = l.{kind}_tag_id
             WHERE l.{kind}_id = ?1 ORDER BY l.rowid",
            kind = kind.name()
        );
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let names = stmt
                .query_map(params![object_id], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(names)
        })
    }
}
