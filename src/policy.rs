use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

pub const BACKUP_PREFIX: &str = "backup_";
pub const BACKUP_SUFFIX: &str = ".json";

/// Fixed-width, zero-padded UTC timestamp so lexicographic order equals
/// chronological order.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Filename for a snapshot captured at the given instant.
pub fn backup_filename_at(instant: DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        BACKUP_PREFIX,
        instant.format(TIMESTAMP_FORMAT),
        BACKUP_SUFFIX
    )
}

/// Filename for a snapshot captured now.
pub fn backup_filename() -> String {
    backup_filename_at(Utc::now())
}

/// Sorts backup filenames newest first. Plain string comparison is valid
/// because of the fixed-width timestamp format.
pub fn sort_newest_first(filenames: &mut [String]) {
    filenames.sort_unstable_by(|a, b| b.cmp(a));
}

/// The filenames beyond the retained count, oldest first, ready for
/// deletion. Expects input already sorted newest first.
pub fn excess_backups(sorted_newest_first: &[String], max_backups: usize) -> Vec<String> {
    if max_backups == 0 || sorted_newest_first.len() <= max_backups {
        return Vec::new();
    }

    let mut excess: Vec<String> = sorted_newest_first[max_backups..].to_vec();
    excess.reverse();
    excess
}

/// Parses the capture instant back out of a backup filename.
pub fn timestamp_of(filename: &str) -> Option<DateTime<Utc>> {
    let stem = filename
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_SUFFIX)?;

    NaiveDateTime::parse_from_str(stem, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
