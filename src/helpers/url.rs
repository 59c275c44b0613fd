//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped inside a URL path (`/` is kept as separator)
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain, for a path that already
/// carries the site root
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/blog/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, rooted_path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    if rooted_path.starts_with("http://") || rooted_path.starts_with("https://") {
        return rooted_path.to_string();
    }
    format!("{}/{}", base, encode_path(rooted_path.trim_start_matches('/')))
}

/// Canonical form used to compare URL paths: leading `/`, no trailing `/`,
/// no trailing `index.html`, no repeated separators
///
/// # Examples
/// ```ignore
/// normalize_path("post/old/") // -> "/post/old"
/// ```
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    let path = path.strip_suffix("index.html").unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Check that a URL path names a location inside the site
///
/// Rejects absolute URLs and any path that could resolve outside the
/// output directory.
///
/// # Examples
/// ```ignore
/// check_site_path("/post/old")        // -> Ok(())
/// check_site_path("/../source/a.md")  // -> Err(..)
/// ```
pub fn check_site_path(path: &str) -> Result<(), &'static str> {
    if path.contains("://") {
        return Err("must be a site path, not an absolute URL");
    }
    if path.contains('\\') {
        return Err("must use `/` as separator");
    }
    if path.split('/').any(|s| s == "." || s == "..") {
        return Err("must not contain `.` or `..` segments");
    }
    Ok(())
}

/// File (relative to the output directory) that serves a URL path
///
/// # Examples
/// ```ignore
/// output_file("/2016/03/08/hub/") // -> "2016/03/08/hub/index.html"
/// output_file("/atom.xml")        // -> "atom.xml"
/// output_file("/post/old")        // -> "post/old/index.html"
/// ```
pub fn output_file(url_path: &str) -> String {
    let clean = url_path.trim_start_matches('/');
    if clean.is_empty() {
        return "index.html".to_string();
    }
    if clean.ends_with('/') {
        return format!("{}index.html", clean);
    }
    let last = clean.rsplit('/').next().unwrap_or(clean);
    if last.contains('.') {
        clean.to_string()
    } else {
        format!("{}/index.html", clean)
    }
}

/// Encode a URL path, keeping separators
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/blog/about/"),
            "https://example.com/blog/about/"
        );
        assert_eq!(
            full_url_for(&config, "/blog/a post/"),
            "https://example.com/blog/a%20post/"
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("post/old/"), "/post/old");
        assert_eq!(normalize_path("//post//old"), "/post/old");
        assert_eq!(normalize_path("/legacy/index.html"), "/legacy");
        assert_eq!(normalize_path("/legacy.html"), "/legacy.html");
    }

    #[test]
    fn test_check_site_path() {
        assert!(check_site_path("/post/old").is_ok());
        assert!(check_site_path("/blog/2016/03/08/hub/").is_ok());
        assert!(check_site_path("/legacy.html").is_ok());
        assert!(check_site_path("/...").is_ok());

        assert!(check_site_path("/../source/about.md").is_err());
        assert!(check_site_path("/post/./old").is_err());
        assert!(check_site_path("/a/..").is_err());
        assert!(check_site_path("/..\\escaped").is_err());
        assert_eq!(
            check_site_path("https://old.example.com/x"),
            Err("must be a site path, not an absolute URL")
        );
    }

    #[test]
    fn test_output_file() {
        assert_eq!(output_file("/"), "index.html");
        assert_eq!(output_file("/about/"), "about/index.html");
        assert_eq!(output_file("/post/old"), "post/old/index.html");
        assert_eq!(output_file("/old.html"), "old.html");
        assert_eq!(output_file("/atom.xml"), "atom.xml");
    }
}
