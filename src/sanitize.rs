use std::sync::LazyLock;

use regex::Regex;

// An unterminated block comment swallows everything up to the end of the
// text, so a stray `/*` cannot leak commented-out references.
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?(?:\*/|$)").unwrap());
static HASH_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)#.*$").unwrap());
static DASH_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)--.*$").unwrap());

/// Remove comments from a query so commented-out table mentions never count
/// as references.
///
/// Block comments are stripped first, then `#` line comments, then `--` line
/// comments, each up to the end of its line. Text outside comment spans is
/// returned untouched.
pub fn strip_comments(sql: &str) -> String {
    let cleaned = BLOCK_COMMENT.replace_all(sql, "");
    let cleaned = HASH_COMMENT.replace_all(&cleaned, "");
    DASH_COMMENT.replace_all(&cleaned, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_block_comments_spanning_lines() {
        let sql = "SELECT a /* drop\nthis\nwhole thing */ FROM `ds.t`";
        assert_eq!(strip_comments(sql), "SELECT a  FROM `ds.t`");
    }

    #[test]
    fn strips_hash_and_dash_comments_to_end_of_line() {
        let sql = "SELECT 1 # trailing\nSELECT 2 -- also trailing\nSELECT 3";
        assert_eq!(strip_comments(sql), "SELECT 1 \nSELECT 2 \nSELECT 3");
    }

    #[test]
    fn unterminated_block_comment_consumes_to_end_of_text() {
        let sql = "SELECT 1\n/* never closed\nFROM `ds.raw`";
        assert_eq!(strip_comments(sql), "SELECT 1\n");
    }

    #[test]
    fn leaves_comment_free_text_unchanged() {
        let sql = "SELECT x, y FROM `ds.t` WHERE x > 1";
        assert_eq!(strip_comments(sql), sql);
    }

    #[test]
    fn is_idempotent() {
        let sql = "SELECT 1 -- c\n/* b */ SELECT 2 # h\n";
        let once = strip_comments(sql);
        assert_eq!(strip_comments(&once), once);
    }
}
