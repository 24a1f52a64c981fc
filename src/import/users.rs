//! Users stage: `ipb_members` + `tbl_user` → `user`.

use super::convert::build_user;
use super::{Importer, SkipReason, SkippedRecord, Stage, StageReport, row_total};
use crate::config::MissingCrossReference;
use crate::types::{LegacyAppUser, LegacyMember};
use anyhow::{Context, Result};
use std::collections::HashSet;
use tracing::warn;

/// Decision for one legacy account.
#[derive(Debug, PartialEq)]
pub(crate) enum Screening {
    Import { warning: Option<String> },
    Skip(SkippedRecord),
}

/// Apply the account filters in order: missing cross-reference, name
/// mismatch, duplicate username, duplicate email.
pub(crate) fn screen_member(
    member: &LegacyMember,
    app_user: Option<&LegacyAppUser>,
    duplicate_usernames: &HashSet<String>,
    duplicate_emails: &HashSet<String>,
    missing_policy: MissingCrossReference,
) -> Screening {
    let skip = |reason, detail: String| {
        Screening::Skip(SkippedRecord {
            id: member.id,
            reason,
            detail,
        })
    };

    let mut warning = None;
    match app_user {
        None => {
            let detail = format!("no cross-reference user for: {} - {}", member.id, member.name);
            if missing_policy == MissingCrossReference::Skip {
                return skip(SkipReason::NoCrossReference, detail);
            }
            warning = Some(detail);
        }
        Some(app_user) if app_user.username != member.name => {
            return skip(
                SkipReason::NameMismatch,
                format!(
                    "name mismatch with cross-reference user for: {} - {} - {}",
                    member.id, member.name, app_user.username
                ),
            );
        }
        Some(_) => {}
    }

    if duplicate_usernames.contains(&member.name) {
        return skip(
            SkipReason::DuplicateUsername,
            format!(
                "not imported, duplicate username: {} - {} - {}",
                member.id, member.name, member.email
            ),
        );
    }
    if duplicate_emails.contains(&member.email) {
        return skip(
            SkipReason::DuplicateEmail,
            format!(
                "not imported, duplicate email: {} - {} - {}",
                member.id, member.name, member.email
            ),
        );
    }

    Screening::Import { warning }
}

impl Importer {
    /// Import forum accounts that are not banned, unique by name and
    /// email, and consistent with their `tbl_user` record.
    ///
    /// Insert failures abort the stage.
    pub fn import_users(&self) -> Result<StageReport> {
        if let Some(report) = self.check_guard(Stage::Users)? {
            return Ok(report);
        }
        let mut report = StageReport::new(Stage::Users);

        let duplicate_emails = self.source.duplicate_emails()?;
        let duplicate_usernames = self.source.duplicate_usernames()?;

        report.total = row_total(self.source.count_members()?);
        let mut progress = self.console.progress("Importing users...", report.total);

        for row in self.source.members(self.options.batch_size) {
            let row = row?;
            let member = LegacyMember::try_from(&row)
                .with_context(|| format!("invalid legacy member {:?}", row.id()))?;
            let app_user = self.source.app_user(member.id)?;

            match screen_member(
                &member,
                app_user.as_ref(),
                &duplicate_usernames,
                &duplicate_emails,
                self.options.missing_cross_reference,
            ) {
                Screening::Skip(skipped) => {
                    warn!(id = member.id, reason = ?skipped.reason, "{}", skipped.detail);
                    report.skipped.push(skipped);
                }
                Screening::Import { warning } => {
                    if let Some(warning) = warning {
                        warn!(id = member.id, "{}", warning);
                        report.warnings.push(warning);
                    }
                    let user = build_user(&member, app_user.as_ref())
                        .with_context(|| format!("invalid legacy member #{}", member.id))?;
                    self.site.insert_user(&user)?;
                    report.imported += 1;
                }
            }
            progress.inc();
        }

        progress.finish();
        self.console.summary(&report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, name: &str, email: &str) -> LegacyMember {
        LegacyMember {
            id,
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    fn app_user(id: i64, username: &str) -> LegacyAppUser {
        LegacyAppUser {
            id,
            username: username.to_string(),
            ..Default::default()
        }
    }

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_clean_member_is_imported() {
        let m = member(1, "alex", "alex@example.com");
        let decision = screen_member(
            &m,
            Some(&app_user(1, "alex")),
            &set(&[]),
            &set(&[]),
            MissingCrossReference::Import,
        );
        assert_eq!(decision, Screening::Import { warning: None });
    }

    #[test]
    fn test_mismatch_is_skipped() {
        let m = member(1, "alex", "alex@example.com");
        let decision = screen_member(
            &m,
            Some(&app_user(1, "alexander")),
            &set(&[]),
            &set(&[]),
            MissingCrossReference::Import,
        );
        match decision {
            Screening::Skip(skipped) => {
                assert_eq!(skipped.reason, SkipReason::NameMismatch);
                assert!(skipped.detail.contains("alexander"));
            }
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_cross_reference_policy() {
        let m = member(2, "qiang", "q@example.com");

        match screen_member(&m, None, &set(&[]), &set(&[]), MissingCrossReference::Import) {
            Screening::Import { warning } => assert!(warning.unwrap().contains("qiang")),
            other => panic!("expected import, got {:?}", other),
        }

        match screen_member(&m, None, &set(&[]), &set(&[]), MissingCrossReference::Skip) {
            Screening::Skip(skipped) => assert_eq!(skipped.reason, SkipReason::NoCrossReference),
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_checks_apply_after_cross_reference() {
        let m = member(3, "dup", "dup@example.com");
        let xref = app_user(3, "dup");

        let by_name = screen_member(
            &m,
            Some(&xref),
            &set(&["dup"]),
            &set(&["dup@example.com"]),
            MissingCrossReference::Import,
        );
        assert!(matches!(
            by_name,
            Screening::Skip(SkippedRecord {
                reason: SkipReason::DuplicateUsername,
                ..
            })
        ));

        let by_email = screen_member(
            &m,
            Some(&xref),
            &set(&[]),
            &set(&["dup@example.com"]),
            MissingCrossReference::Import,
        );
        assert!(matches!(
            by_email,
            Screening::Skip(SkippedRecord {
                reason: SkipReason::DuplicateEmail,
                ..
            })
        ));

        // Missing cross-reference still goes through the duplicate checks.
        let missing = screen_member(
            &m,
            None,
            &set(&[]),
            &set(&["dup@example.com"]),
            MissingCrossReference::Import,
        );
        assert!(matches!(
            missing,
            Screening::Skip(SkippedRecord {
                reason: SkipReason::DuplicateEmail,
                ..
            })
        ));
    }
}
