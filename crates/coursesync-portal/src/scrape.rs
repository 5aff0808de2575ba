//! HTML extraction for Moodle pages
//!
//! Moodle's markup is regular enough that a handful of regular expressions
//! cover what we need: hidden form inputs, anchors with a given class, and
//! the page heading. Tag matching is case-insensitive and tolerant of
//! attribute order and quoting style.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static INPUT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<input\b[^>]*>").expect("valid input regex"));

static ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("valid anchor regex"));

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").expect("valid heading regex"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));

/// An anchor found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Raw `href` value (entity-decoded, possibly relative)
    pub href: String,
    /// Visible text, tags stripped and whitespace collapsed
    pub text: String,
}

/// Parses the attributes of a tag into a lowercase-keyed map
fn attributes(tag: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(tag)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

fn has_class(attrs: &HashMap<String, String>, class: &str) -> bool {
    attrs
        .get("class")
        .map(|c| c.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Decodes the named entities Moodle emits plus numeric references
pub fn decode_entities(input: &str) -> String {
    ENTITY
        .replace_all(input, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    "ndash" => Some('\u{2013}'),
                    "mdash" => Some('\u{2014}'),
                    "hellip" => Some('\u{2026}'),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Visible text of an HTML fragment
pub fn text_content(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, " ");
    let decoded = decode_entities(&stripped);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

/// Value of the hidden `logintoken` input on the login form, if present
pub fn login_token(html: &str) -> Option<String> {
    INPUT_TAG.find_iter(html).find_map(|tag| {
        let attrs = attributes(tag.as_str());
        match attrs.get("name") {
            Some(name) if name == "logintoken" => attrs.get("value").cloned(),
            _ => None,
        }
    })
}

/// True if the page contains the Moodle login form
pub fn is_login_form(html: &str) -> bool {
    INPUT_TAG.find_iter(html).any(|tag| {
        let attrs = attributes(tag.as_str());
        attrs.get("name").map(String::as_str) == Some("password")
            && attrs.get("type").map(|t| t.eq_ignore_ascii_case("password")) == Some(true)
    })
}

/// All anchors carrying `class` that have an `href`
pub fn links_with_class(html: &str, class: &str) -> Vec<Link> {
    ANCHOR
        .captures_iter(html)
        .filter_map(|caps| {
            let attrs = attributes(&caps[1]);
            if !has_class(&attrs, class) {
                return None;
            }
            let href = attrs.get("href")?.trim().to_string();
            if href.is_empty() {
                return None;
            }
            Some(Link {
                href,
                text: text_content(&caps[2]),
            })
        })
        .collect()
}

/// Enrolled course links on the dashboard
pub fn course_links(html: &str) -> Vec<Link> {
    links_with_class(html, "course-link")
}

/// File resource links on a course page
pub fn resource_links(html: &str) -> Vec<Link> {
    links_with_class(html, "resource")
}

/// Text of the first `<h1>`, used as the course name
pub fn page_heading(html: &str) -> Option<String> {
    HEADING
        .captures(html)
        .map(|caps| text_content(&caps[1]))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
        <form class="login-form" action="https://moodle.test/login/index.php" method="post" id="login">
            <input id="anchor" type="hidden" name="anchor" value="">
            <input type="hidden" name="logintoken" value="aB3dE5fG7hI9">
            <input type="text" name="username" id="username" value="">
            <input type="password" name="password" id="password" value="">
        </form>"#;

    const COURSE_PAGE: &str = r#"
        <div id="page-header"><h1 class="h2">Linear   Algebra &amp; Geometry</h1></div>
        <ul class="section">
          <li><a class="aalink resource" href="https://moodle.test/mod/resource/view.php?id=11">
                <span class="instancename">Lecture 1 &ndash; Vectors</span></a></li>
          <li><a href='/mod/resource/view.php?id=12' class='resource'>Exercise sheet&#32;1.pdf</a></li>
          <li><a class="forum" href="/mod/forum/view.php?id=13">Announcements</a></li>
          <li><A CLASS="resource" HREF="view.php?id=14&amp;redirect=1">Notes &#x2014; week 2</A></li>
        </ul>"#;

    #[test]
    fn test_login_token_any_attribute_order() {
        assert_eq!(login_token(LOGIN_PAGE).as_deref(), Some("aB3dE5fG7hI9"));
        assert_eq!(
            login_token(r#"<input value='tok' name='logintoken' type='hidden'/>"#).as_deref(),
            Some("tok")
        );
        assert!(login_token("<html><body>No form</body></html>").is_none());
    }

    #[test]
    fn test_is_login_form() {
        assert!(is_login_form(LOGIN_PAGE));
        assert!(!is_login_form(COURSE_PAGE));
    }

    #[test]
    fn test_resource_links() {
        let links = resource_links(COURSE_PAGE);
        assert_eq!(
            links,
            vec![
                Link {
                    href: "https://moodle.test/mod/resource/view.php?id=11".into(),
                    text: "Lecture 1 \u{2013} Vectors".into(),
                },
                Link {
                    href: "/mod/resource/view.php?id=12".into(),
                    text: "Exercise sheet 1.pdf".into(),
                },
                Link {
                    href: "view.php?id=14&redirect=1".into(),
                    text: "Notes \u{2014} week 2".into(),
                },
            ]
        );
    }

    #[test]
    fn test_page_heading_collapses_whitespace() {
        assert_eq!(
            page_heading(COURSE_PAGE).as_deref(),
            Some("Linear Algebra & Geometry")
        );
        assert!(page_heading("<h1>  </h1>").is_none());
    }

    #[test]
    fn test_course_links_match_whole_class_names() {
        let html = r#"
            <a class="course-link" href="/course/view.php?id=2">Algebra</a>
            <a class="course-linkish" href="/course/view.php?id=3">Nope</a>
            <a class="btn course-link" href="">Empty</a>"#;
        let links = course_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/course/view.php?id=2");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#39;x&#x27;"), "'x'");
        assert_eq!(decode_entities("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
    }

    #[test]
    fn test_text_content_strips_nested_tags() {
        assert_eq!(
            text_content("<span>Slides</span><span class=\"accesshide\"> File</span>"),
            "Slides File"
        );
    }
}
