use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};
use reqwest::{cookie::Jar, Url};

use crate::error::Result;

pub const COOKIE_FILE_NAMES: [&str; 2] = ["cookie.txt", "cookies.txt"];

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// Looks for an exported cookie store in `dir`.
pub fn find_cookie_file(dir: &Path) -> Option<PathBuf> {
    COOKIE_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// One entry of a Netscape cookie file.
#[derive(Debug, PartialEq, Eq)]
struct NetscapeCookie<'a> {
    domain: &'a str,
    include_subdomains: bool,
    path: &'a str,
    secure: bool,
    http_only: bool,
    name: &'a str,
    value: &'a str,
}

impl<'a> NetscapeCookie<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None if line.starts_with('#') || line.trim().is_empty() => return None,
            None => (line, false),
        };

        let fields: Vec<&str> = line.split('\t').collect();
        // Expiry (index 4) is ignored, everything is loaded as a session cookie
        let [domain, include_subdomains, path, secure, _expiry, name, rest @ ..] =
            fields.as_slice()
        else {
            debug!("Skipping malformed cookie line: {}", line);
            return None;
        };
        if domain.is_empty() || name.is_empty() {
            debug!("Skipping malformed cookie line: {}", line);
            return None;
        }

        Some(Self {
            domain: *domain,
            include_subdomains: include_subdomains.eq_ignore_ascii_case("TRUE"),
            path: if path.is_empty() { "/" } else { *path },
            secure: secure.eq_ignore_ascii_case("TRUE"),
            http_only,
            name: *name,
            value: rest.first().copied().unwrap_or_default(),
        })
    }

    fn origin(&self) -> Option<Url> {
        let host = self.domain.trim_start_matches('.');
        Url::parse(&format!("https://{}{}", host, self.path)).ok()
    }

    fn to_set_cookie(&self) -> String {
        let mut cookie = format!("{}={}; Path={}", self.name, self.value, self.path);
        if self.include_subdomains {
            cookie.push_str("; Domain=");
            cookie.push_str(self.domain.trim_start_matches('.'));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie
    }
}

/// Loads a Netscape/Mozilla cookie file into a jar usable by reqwest.
pub fn load_cookie_jar(path: &Path) -> Result<Jar> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read cookie file {}", path.display()))?;

    let jar = Jar::default();
    let mut loaded = 0;
    for cookie in content.lines().filter_map(NetscapeCookie::parse) {
        match cookie.origin() {
            Some(url) => {
                jar.add_cookie_str(&cookie.to_set_cookie(), &url);
                loaded += 1;
            }
            None => debug!("Skipping cookie with invalid domain {}", cookie.domain),
        }
    }

    info!("Loaded {} cookies from {}", loaded, path.display());
    Ok(jar)
}
