//! JQL query construction.

/// Quote a JQL value, escaping backslashes and double quotes.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Build the search filter for one fix version and a set of authors.
///
/// `author_field` is the issue field the authors are matched against,
/// usually `reporter` or `assignee`.
pub fn build_jql(
    project: &str,
    fix_version: &str,
    authors: &[String],
    author_field: &str,
) -> String {
    let author_clause = authors
        .iter()
        .map(|author| format!("{} = {}", author_field, quote(author)))
        .collect::<Vec<_>>()
        .join(" OR ");

    let mut jql = format!(
        "project = {} AND fixVersion = {}",
        quote(project),
        quote(fix_version)
    );
    if !author_clause.is_empty() {
        jql.push_str(&format!(" AND ({})", author_clause));
    }
    jql
}

/// Split a comma-separated author list, trimming and dropping blanks.
pub fn split_authors(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
