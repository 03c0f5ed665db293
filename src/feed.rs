// ABOUTME: Feed builder for the mdpress application
// ABOUTME: Turns dated post filenames into a newest-first list of links

use crate::errors::{PublishError, Result};
use crate::html::Renderer;
use crate::scan;
use crate::utils;
use chrono::NaiveDate;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// A post, as described by its `YYYY-MM-DD-title-words` filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub date: NaiveDate,
    pub title: String,
    /// Filename with the extension stripped
    pub slug: String,
}

impl PostRecord {
    /// Parse a post filename (extension optional)
    pub fn parse(file_name: &str) -> Result<Self> {
        let slug = utils::strip_extension(Path::new(file_name))
            .to_string_lossy()
            .into_owned();
        let parts: Vec<&str> = slug.split('-').collect();
        if parts.len() < 4 {
            return Err(PublishError::DateParse {
                file: file_name.to_string(),
                reason: "expected YYYY-MM-DD-title".to_string(),
            });
        }

        let number = |part: &str, what: &str| -> Result<u32> {
            part.parse::<u32>().map_err(|_| PublishError::DateParse {
                file: file_name.to_string(),
                reason: format!("{} {:?} is not a number", what, part),
            })
        };
        let year = number(parts[0], "year")?;
        let month = number(parts[1], "month")?;
        let day = number(parts[2], "day")?;

        let date = i32::try_from(year)
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
            .ok_or_else(|| PublishError::DateParse {
                file: file_name.to_string(),
                reason: format!("{}-{}-{} is not a calendar date", year, month, day),
            })?;

        let title = humanize(&parts[3..]);
        if title.is_empty() {
            return Err(PublishError::DateParse {
                file: file_name.to_string(),
                reason: "missing title".to_string(),
            });
        }

        Ok(Self { date, title, slug })
    }

    /// Date as shown in the feed, e.g. "March 22, 2022" or "May 01, 2023"
    pub fn date_string(&self) -> String {
        self.date.format("%B %d, %Y").to_string()
    }

    /// Markup block for this post
    pub fn entry_markdown(&self, link_prefix: &str) -> String {
        format!(
            "<span class=\"post-date\" style=\"font-size: 14px; color: #828282;\"> *{}*</span>\n\n### [{}]({}{}.html)\n\n<br/>\n",
            self.date_string(),
            self.title,
            link_prefix,
            self.slug
        )
    }
}

/// Capitalize each word: first letter upper-case, the rest lower-case
fn humanize(words: &[&str]) -> String {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Collect the posts directly inside `posts_dir`, newest first.
///
/// Any filename that does not parse aborts the whole listing.
pub fn collect_posts(posts_dir: &Path) -> Result<Vec<PostRecord>> {
    let mut posts = Vec::new();
    for file in scan::list_files(posts_dir)? {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        posts.push(PostRecord::parse(&name)?);
    }

    // Stable sort keeps filename order among posts sharing a date
    posts.sort_by_key(|p| p.date);
    posts.reverse();
    debug!("Found {} posts in {:?}", posts.len(), posts_dir);
    Ok(posts)
}

/// Build the feed document for `posts_dir`, rendered to HTML
pub fn build_feed(
    posts_dir: &Path,
    link_prefix: &str,
    renderer: &dyn Renderer,
) -> Result<(String, usize)> {
    let posts = collect_posts(posts_dir)?;
    let document = posts
        .iter()
        .map(|post| renderer.render_markdown(&post.entry_markdown(link_prefix)))
        .collect::<String>();
    Ok((document, posts.len()))
}

/// Build the feed and write it to `feed_file`, replacing what was there
pub fn write_feed(
    posts_dir: &Path,
    feed_file: &Path,
    link_prefix: &str,
    renderer: &dyn Renderer,
) -> Result<usize> {
    let (document, count) = build_feed(posts_dir, link_prefix, renderer)?;
    if let Some(parent) = feed_file.parent() {
        if !parent.as_os_str().is_empty() {
            utils::ensure_directory_exists(parent)?;
        }
    }
    fs::write(feed_file, document).map_err(|e| PublishError::Write {
        path: feed_file.to_path_buf(),
        source: e,
    })?;
    info!("Feed written to {:?} ({} posts)", feed_file, count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_humanizes_title_and_date() {
        let post = PostRecord::parse("2022-03-22-who-am-i.md").unwrap();
        assert_eq!(post.title, "Who Am I");
        assert_eq!(post.date_string(), "March 22, 2022");
        assert_eq!(post.slug, "2022-03-22-who-am-i");
    }

    #[test]
    fn test_day_keeps_two_digits() {
        let post = PostRecord::parse("2023-05-01-hello.md").unwrap();
        assert_eq!(post.date_string(), "May 01, 2023");
    }

    #[test]
    fn test_extensionless_name_parses() {
        let post = PostRecord::parse("2022-03-22-who-am-i").unwrap();
        assert_eq!(post.slug, "2022-03-22-who-am-i");
        assert_eq!(post.title, "Who Am I");
    }

    #[test]
    fn test_title_words_are_lowercased_after_first_letter() {
        let post = PostRecord::parse("2022-01-01-iOS-TIPS").unwrap();
        assert_eq!(post.title, "Ios Tips");
    }

    #[test]
    fn test_too_few_tokens_fails() {
        let result = PostRecord::parse("2022-bad");
        assert!(matches!(result, Err(PublishError::DateParse { .. })));
    }

    #[test]
    fn test_invalid_calendar_date_fails() {
        assert!(matches!(
            PostRecord::parse("2022-02-30-leap"),
            Err(PublishError::DateParse { .. })
        ));
        assert!(matches!(
            PostRecord::parse("twenty-02-03-words"),
            Err(PublishError::DateParse { .. })
        ));
    }

    #[test]
    fn test_entry_links_to_rendered_page() {
        let post = PostRecord::parse("2022-03-22-who-am-i.md").unwrap();
        let md = post.entry_markdown("/posts/");
        assert!(md.contains("### [Who Am I](/posts/2022-03-22-who-am-i.html)"));
        assert!(md.contains("> *March 22, 2022*</span>"));
    }
}
