use std::collections::HashSet;

use log::{debug, info, warn};
use regex::Regex;
use reqwest::Url;
use scraper::Html;
use serde::de::DeserializeOwned;

use crate::{
    client::Fetch,
    error::{OrlyError, Result},
    html::{element_text, selector},
    models::{BookMetadata, ChapterRef, ChaptersResponse, TocElement},
    naming::{sanitize_or, MISC_MODULE},
};

lazy_static! {
    static ref CATALOG_ID: Regex =
        Regex::new(r"/(?:view|course|videos|book)/[^/]+/([^/?#]+)").expect("valid catalog id regex");
}

const API_VERSIONS: [&str; 2] = ["v2", "v1"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Book,
    Course,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Chapter,
    Lesson,
}

/// A single downloadable unit. Only built once its url is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub position: usize,
    pub label: String,
    pub url: Url,
    pub kind: ResourceKind,
    pub parent_module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrouping {
    /// `0` for the catch-all module of lessons that had no parent.
    pub position: usize,
    pub label: String,
    pub lessons: Vec<ResourceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Chapters(Vec<ResourceDescriptor>),
    Modules(Vec<ModuleGrouping>),
    /// Nothing is known about the structure, the entry url is the only unit.
    PassThrough(ResourceDescriptor),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub title: Option<String>,
    pub content: Content,
}

impl Resolution {
    pub fn resource_count(&self) -> usize {
        match &self.content {
            Content::Chapters(chapters) => chapters.len(),
            Content::Modules(modules) => modules.iter().map(|m| m.lessons.len()).sum(),
            Content::PassThrough(_) => 1,
        }
    }
}

/// Ways of discovering the table of contents, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Links inside the toc container of the entry page
    EmbeddedToc,
    /// Book metadata api, v2 first then v1
    MetadataApi,
    /// Module/lesson tree of a video course
    CourseToc,
}

pub const BOOK_STRATEGIES: &[Strategy] = &[Strategy::EmbeddedToc, Strategy::MetadataApi];
pub const COURSE_STRATEGIES: &[Strategy] = &[Strategy::CourseToc];

impl ContentKind {
    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            ContentKind::Book => BOOK_STRATEGIES,
            ContentKind::Course => COURSE_STRATEGIES,
        }
    }

    fn resource_kind(self) -> ResourceKind {
        match self {
            ContentKind::Book => ResourceKind::Chapter,
            ContentKind::Course => ResourceKind::Lesson,
        }
    }
}

/// Extracts the opaque catalog identifier from urls shaped like
/// `/library/view/<slug>/<id>/` or `/course/<slug>/<id>/`.
pub fn catalog_id(url: &Url) -> Option<String> {
    CATALOG_ID
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    match base.join(href.trim()) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!("Ignoring invalid link {}: {}", href, err);
            None
        }
    }
}

fn chapter(position: usize, label: Option<&str>, url: Url) -> ResourceDescriptor {
    ResourceDescriptor {
        position,
        label: sanitize_or(label, || format!("Chapter {}", position)),
        url,
        kind: ResourceKind::Chapter,
        parent_module: None,
    }
}

fn toc_links(document: &Html, base: &Url) -> Result<Option<Vec<ResourceDescriptor>>> {
    let container = match document.select(&selector(r#"[class*="toc"]"#)?).next() {
        Some(container) => container,
        None => return Ok(None),
    };

    let links = selector("a[href]")?;
    let chapters = container
        .select(&links)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            resolve_link(base, href).map(|url| (element_text(link), url))
        })
        .enumerate()
        .map(|(idx, (text, url))| chapter(idx + 1, Some(text.as_str()), url))
        .collect();

    Ok(Some(chapters))
}

/// Chapters linked from the table of contents container of a book page,
/// in document order. `None` when the page has no such container.
pub fn parse_embedded_toc(html: &str, base: &Url) -> Result<Option<Vec<ResourceDescriptor>>> {
    toc_links(&Html::parse_document(html), base)
}

fn document_title(document: &Html) -> Option<String> {
    for css in ["h1.t-title", "h1"] {
        let sel = selector(css).ok()?;
        if let Some(heading) = document.select(&sel).next() {
            let title = element_text(heading);
            if !title.is_empty() {
                return Some(title);
            }
        }
    }
    None
}

/// Title shown on a book page.
pub fn page_title(html: &str) -> Option<String> {
    document_title(&Html::parse_document(html))
}

/// Chapter references in listed order, entries without a link are dropped.
pub fn chapters_from_refs(refs: &[ChapterRef], base: &Url) -> Vec<ResourceDescriptor> {
    refs.iter()
        .filter_map(|chapter_ref| {
            let url = resolve_link(base, chapter_ref.link()?)?;
            Some((chapter_ref.title(), url))
        })
        .enumerate()
        .map(|(idx, (title, url))| chapter(idx + 1, title, url))
        .collect()
}

fn lessons(children: &[TocElement], module_label: &str, base: &Url) -> Vec<ResourceDescriptor> {
    children
        .iter()
        .filter_map(|child| {
            let href = child.url.as_deref().filter(|href| !href.trim().is_empty())?;
            resolve_link(base, href).map(|url| (child.label.as_deref(), url))
        })
        .enumerate()
        .map(|(idx, (label, url))| ResourceDescriptor {
            position: idx + 1,
            label: sanitize_or(label, || format!("Lesson {}", idx + 1)),
            url,
            kind: ResourceKind::Lesson,
            parent_module: Some(module_label.to_string()),
        })
        .collect()
}

/// Normalizes a course toc into module groupings.
///
/// Modules without children but with their own url are collected, in toc
/// order, as the lessons of a single catch-all module at position 0 that comes
/// first. Modules that end up without any lesson are dropped, and regular
/// modules are numbered densely in the order they are kept.
pub fn group_modules(toc: &[TocElement], base: &Url) -> Vec<ModuleGrouping> {
    let mut modules = Vec::new();
    let mut leaves = Vec::new();

    for element in toc {
        if element.children().is_empty() {
            if element.url.is_some() {
                leaves.push(element.clone());
            } else {
                debug!("Dropping module {:?} without lessons", element.label);
            }
            continue;
        }

        let position = modules.len() + 1;
        let label = sanitize_or(element.label.as_deref(), || format!("Module {}", position));
        let lessons = lessons(element.children(), &label, base);
        if lessons.is_empty() {
            debug!("Dropping module {} without lesson urls", label);
            continue;
        }
        modules.push(ModuleGrouping {
            position,
            label,
            lessons,
        });
    }

    let misc = lessons(&leaves, MISC_MODULE, base);
    if !misc.is_empty() {
        modules.insert(
            0,
            ModuleGrouping {
                position: 0,
                label: MISC_MODULE.to_string(),
                lessons: misc,
            },
        );
    }

    modules
}

struct Found {
    title: Option<String>,
    content: Content,
}

/// What we know about the url the user entered.
struct Entry {
    url: Url,
    catalog_id: Option<String>,
    /// Body of the entry page, only loaded for books
    page: Option<String>,
}

pub struct Resolver<'a, F> {
    fetch: &'a F,
}

impl<'a, F: Fetch> Resolver<'a, F> {
    pub fn new(fetch: &'a F) -> Self {
        Self { fetch }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let body = self.fetch.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Resolves `entry_url` into an ordered list of chapters or modules.
    pub async fn resolve(&self, entry_url: &Url, kind: ContentKind) -> Result<Resolution> {
        let catalog_id = catalog_id(entry_url);
        match &catalog_id {
            Some(id) => info!("Detected catalog id: {}", id),
            None => warn!("Could not detect a catalog id in {}", entry_url),
        }

        let page = match kind {
            ContentKind::Book => match self.fetch.get_text(entry_url).await {
                Ok(page) => Some(page),
                Err(err) => {
                    warn!("Unable to load {}: {}", entry_url, err);
                    None
                }
            },
            ContentKind::Course => None,
        };

        let entry = Entry {
            url: entry_url.clone(),
            catalog_id,
            page,
        };

        let mut toc_unreachable = false;
        for &strategy in kind.strategies() {
            match self.run(strategy, &entry).await {
                Ok(Some(found)) => {
                    debug!("{:?} resolved the table of contents", strategy);
                    let title = found
                        .title
                        .or_else(|| entry.page.as_deref().and_then(page_title));
                    return Ok(Resolution {
                        title,
                        content: found.content,
                    });
                }
                Ok(None) => debug!("{:?} found nothing", strategy),
                Err(err) => {
                    if strategy == Strategy::CourseToc && err.is_transport() {
                        toc_unreachable = true;
                    }
                    warn!("{:?} failed: {}", strategy, err);
                }
            }
        }

        if entry.catalog_id.is_none() || toc_unreachable {
            warn!("Falling back to pass-through, metadata might be incomplete");
            return Ok(Resolution {
                title: entry.page.as_deref().and_then(page_title),
                content: Content::PassThrough(ResourceDescriptor {
                    position: 1,
                    label: String::new(),
                    url: entry.url,
                    kind: kind.resource_kind(),
                    parent_module: None,
                }),
            });
        }

        Err(OrlyError::Resolution(format!(
            "no chapters or lessons found for {}",
            entry_url
        )))
    }

    async fn run(&self, strategy: Strategy, entry: &Entry) -> Result<Option<Found>> {
        match strategy {
            Strategy::EmbeddedToc => self.embedded_toc(entry),
            Strategy::MetadataApi => self.metadata_api(entry).await,
            Strategy::CourseToc => self.course_toc(entry).await,
        }
    }

    fn embedded_toc(&self, entry: &Entry) -> Result<Option<Found>> {
        let page = match &entry.page {
            Some(page) => page,
            None => return Ok(None),
        };

        let document = Html::parse_document(page);
        match toc_links(&document, &entry.url)? {
            Some(chapters) if !chapters.is_empty() => Ok(Some(Found {
                title: document_title(&document),
                content: Content::Chapters(chapters),
            })),
            Some(_) => {
                warn!("Table of contents has no links");
                Ok(None)
            }
            None => {
                warn!("Explicit table of contents not found, trying the api");
                Ok(None)
            }
        }
    }

    async fn fetch_metadata(&self, id: &str) -> Result<BookMetadata> {
        let mut last_err = OrlyError::Resolution(format!("no metadata for {}", id));
        for version in API_VERSIONS {
            let url = self.fetch.api_url(&format!("api/{}/book/{}/", version, id))?;
            match self.get_json::<BookMetadata>(&url).await {
                Ok(metadata) => {
                    info!("Found metadata via API {}", version);
                    return Ok(metadata);
                }
                Err(err) => {
                    debug!("API {} metadata failed: {}", version, err);
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Follows `next` links until the listing is exhausted.
    async fn fetch_chapter_pages(&self, first: Url) -> Result<Vec<ChapterRef>> {
        let mut refs = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(first);

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                break;
            }
            let page: ChaptersResponse = self.get_json(&url).await?;
            refs.extend(page.results);
            next = page.next.as_deref().and_then(|href| resolve_link(&url, href));
        }

        Ok(refs)
    }

    async fn metadata_api(&self, entry: &Entry) -> Result<Option<Found>> {
        let id = match &entry.catalog_id {
            Some(id) => id,
            None => return Ok(None),
        };

        let metadata = self.fetch_metadata(id).await?;
        if metadata.is_video() {
            warn!("This url appears to be a video course, not a book. Use the course command to download it properly");
        }

        let chapters = match &metadata.chapters {
            Some(inline) if !inline.is_empty() => {
                info!("Found chapters in metadata");
                chapters_from_refs(inline, &entry.url)
            }
            _ => {
                let listing = match &metadata.chapters_url {
                    Some(href) => resolve_link(&entry.url, href),
                    None => None,
                };
                let listing = match listing {
                    Some(url) => url,
                    None => self.fetch.api_url(&format!("api/v2/book/{}/chapters/", id))?,
                };
                let refs = self.fetch_chapter_pages(listing.clone()).await?;
                chapters_from_refs(&refs, &listing)
            }
        };

        if chapters.is_empty() {
            return Ok(None);
        }
        Ok(Some(Found {
            title: metadata.title,
            content: Content::Chapters(chapters),
        }))
    }

    async fn course_toc(&self, entry: &Entry) -> Result<Option<Found>> {
        let id = match &entry.catalog_id {
            Some(id) => id,
            None => return Ok(None),
        };

        let title = match self.fetch_metadata(id).await {
            Ok(metadata) => metadata.title,
            Err(err) => {
                warn!("Unable to load course title: {}", err);
                None
            }
        };

        info!("Fetching course table of contents");
        let url = self.fetch.api_url(&format!("api/v1/book/{}/toc/", id))?;
        let toc: Vec<TocElement> = self.get_json(&url).await?;
        let modules = group_modules(&toc, &entry.url);

        if modules.is_empty() {
            return Ok(None);
        }
        Ok(Some(Found {
            title,
            content: Content::Modules(modules),
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use reqwest::StatusCode;

    use super::*;

    /// Serves canned bodies, everything else is a 404.
    #[derive(Default)]
    pub(crate) struct FakeFetch {
        pub pages: HashMap<String, String>,
    }

    impl FakeFetch {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl Fetch for FakeFetch {
        fn api_url(&self, endpoint: &str) -> Result<Url> {
            Ok(Url::parse("https://host/").unwrap().join(endpoint).unwrap())
        }

        async fn get_text(&self, url: &Url) -> Result<String> {
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| OrlyError::Status {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                })
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    const BOOK_URL: &str = "https://host/library/view/learning-rust/9781234/";

    #[test]
    fn extracts_catalog_ids() {
        assert_eq!(catalog_id(&url(BOOK_URL)).as_deref(), Some("9781234"));
        assert_eq!(
            catalog_id(&url("https://host/course/x/ABC123/")).as_deref(),
            Some("ABC123")
        );
        assert_eq!(
            catalog_id(&url("https://host/videos/slug/0636920/9780636920-video1/")).as_deref(),
            Some("0636920")
        );
        assert_eq!(catalog_id(&url("https://host/library/view/learning-rust/")), None);
        assert_eq!(catalog_id(&url("https://host/watch?v=42")), None);
    }

    #[test]
    fn embedded_toc_keeps_every_link_in_order() {
        let html = r#"<html><body>
            <nav class="top"><a href="/elsewhere">skip</a></nav>
            <ol class="detail-toc">
              <li><a href="ch01.html">Chapter: One</a></li>
              <li><a href="https://cdn.host/abs/ch02.html">Two</a></li>
              <li><a href="ch01.html">   </a></li>
              <li><span>no link</span></li>
            </ol></body></html>"#;

        let chapters = parse_embedded_toc(html, &url(BOOK_URL)).unwrap().unwrap();
        let urls: Vec<_> = chapters.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://host/library/view/learning-rust/9781234/ch01.html",
                "https://cdn.host/abs/ch02.html",
                "https://host/library/view/learning-rust/9781234/ch01.html",
            ]
        );
        let labels: Vec<_> = chapters.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Chapter One", "Two", "Chapter 3"]);
        assert_eq!(chapters[2].position, 3);
    }

    #[test]
    fn embedded_toc_absent() {
        let html = "<html><body><a href='x'>x</a></body></html>";
        assert_eq!(parse_embedded_toc(html, &url(BOOK_URL)).unwrap(), None);
    }

    #[test]
    fn page_title_prefers_t_title() {
        assert_eq!(
            page_title("<h1>Site</h1><h1 class='t-title'> Learning\n Rust </h1>").as_deref(),
            Some("Learning Rust")
        );
        assert_eq!(page_title("<h1>Only</h1>").as_deref(), Some("Only"));
        assert_eq!(page_title("<p>none</p>"), None);
    }

    #[test]
    fn leaf_and_empty_modules_are_normalized() {
        let toc: Vec<TocElement> = serde_json::from_str(
            r#"[
                {"label": "Intro", "children": [{"label": "Welcome", "url": "https://host/v/1"}]},
                {"label": "Empty", "children": []},
                {"label": "Standalone", "url": "https://host/v/2"},
                {"label": "No urls", "children": [{"label": "x"}]},
                {"label": "?*", "children": [{"url": "https://host/v/3"}, {"label": "Gap"}, {"label": "", "url": "/v/4"}]}
            ]"#,
        )
        .unwrap();

        let modules = group_modules(&toc, &url("https://host/course/x/ABC123/"));
        assert!(modules.len() < toc.len());
        assert_eq!(modules.len(), 3);

        assert_eq!(modules[0].position, 0);
        assert_eq!(modules[0].label, MISC_MODULE);
        assert_eq!(modules[0].lessons.len(), 1);
        assert_eq!(modules[0].lessons[0].label, "Standalone");

        assert_eq!(modules[1].position, 1);
        assert_eq!(modules[1].label, "Intro");

        assert_eq!(modules[2].position, 2);
        assert_eq!(modules[2].label, "Module 2");
        let lessons: Vec<_> = modules[2]
            .lessons
            .iter()
            .map(|l| (l.position, l.label.as_str(), l.url.as_str()))
            .collect();
        assert_eq!(
            lessons,
            vec![
                (1, "Lesson 1", "https://host/v/3"),
                (2, "Lesson 2", "https://host/v/4"),
            ]
        );
        assert_eq!(modules[2].lessons[0].parent_module.as_deref(), Some("Module 2"));
    }

    #[test]
    fn leaf_modules_share_one_numbered_misc_module() {
        let toc: Vec<TocElement> = serde_json::from_str(
            r#"[
                {"label": "", "url": "https://host/v/1"},
                {"label": "Intro", "children": [{"label": "Welcome", "url": "https://host/v/2"}]},
                {"label": "", "url": "https://host/v/3"},
                {"label": "Wrap up", "url": "https://host/v/4"}
            ]"#,
        )
        .unwrap();

        let modules = group_modules(&toc, &url("https://host/course/x/ABC123/"));
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].position, 0);
        assert_eq!(modules[0].label, MISC_MODULE);
        assert_eq!(modules[1].position, 1);

        let misc: Vec<_> = modules[0]
            .lessons
            .iter()
            .map(|l| (l.position, l.label.as_str(), l.url.as_str()))
            .collect();
        assert_eq!(
            misc,
            vec![
                (1, "Lesson 1", "https://host/v/1"),
                (2, "Lesson 2", "https://host/v/3"),
                (3, "Wrap up", "https://host/v/4"),
            ]
        );

        let base = std::path::Path::new("Downloads");
        let paths: HashSet<_> = modules
            .iter()
            .flat_map(|module| {
                module.lessons.iter().map(move |lesson| {
                    crate::naming::lesson_path(
                        base,
                        "C",
                        module.position,
                        &module.label,
                        lesson.position,
                        &lesson.label,
                    )
                })
            })
            .collect();
        assert_eq!(paths.len(), 4);
        assert!(paths.contains(&base.join("C/00 - Introduction_or_Misc/01 - Lesson 1.mp4")));
        assert!(paths.contains(&base.join("C/00 - Introduction_or_Misc/02 - Lesson 2.mp4")));
    }

    #[test]
    fn empty_label_at_third_position_gets_default() {
        let toc: Vec<TocElement> = serde_json::from_str(
            r#"[
                {"label": "A", "children": [{"url": "https://host/v/1"}]},
                {"label": "B", "children": [{"url": "https://host/v/2"}]},
                {"label": "", "children": [{"url": "https://host/v/3"}]}
            ]"#,
        )
        .unwrap();

        let modules = group_modules(&toc, &url("https://host/"));
        assert_eq!(modules[2].position, 3);
        assert_eq!(modules[2].label, "Module 3");
    }

    #[tokio::test]
    async fn missing_catalog_id_passes_through() {
        let fetch = FakeFetch::default();
        let resolver = Resolver::new(&fetch);
        let entry = url("https://host/videos/standalone-clip");

        for kind in [ContentKind::Book, ContentKind::Course] {
            let resolution = resolver.resolve(&entry, kind).await.unwrap();
            match &resolution.content {
                Content::PassThrough(unit) => {
                    assert_eq!(unit.url, entry);
                    assert_eq!(unit.position, 1);
                }
                other => panic!("expected pass-through, got {:?}", other),
            }
            assert_eq!(resolution.resource_count(), 1);
        }
    }

    #[tokio::test]
    async fn book_uses_embedded_toc_first() {
        let fetch = FakeFetch::default().with(
            BOOK_URL,
            r#"<h1 class="t-title">Learning Rust</h1><div class="toc"><a href="ch01.html">One</a></div>"#,
        );

        let resolution = Resolver::new(&fetch)
            .resolve(&url(BOOK_URL), ContentKind::Book)
            .await
            .unwrap();
        assert_eq!(resolution.title.as_deref(), Some("Learning Rust"));
        assert_eq!(resolution.resource_count(), 1);
    }

    #[tokio::test]
    async fn book_falls_back_to_v1_inline_chapters() {
        let fetch = FakeFetch::default()
            .with(BOOK_URL, "<h1>Learning Rust</h1><p>no toc here</p>")
            .with(
                "https://host/api/v1/book/9781234/",
                r#"{"title": "Learning Rust", "chapters": [
                    {"title": "Preface", "web_url": "https://host/library/view/learning-rust/9781234/pr01.html"},
                    {"title": "Missing"},
                    "https://host/api/v1/book/9781234/chapter/ch01.html"
                ]}"#,
            );

        let resolution = Resolver::new(&fetch)
            .resolve(&url(BOOK_URL), ContentKind::Book)
            .await
            .unwrap();
        match resolution.content {
            Content::Chapters(chapters) => {
                assert_eq!(chapters.len(), 2);
                assert_eq!(chapters[0].label, "Preface");
                assert_eq!(chapters[1].position, 2);
                assert_eq!(
                    chapters[1].url.as_str(),
                    "https://host/api/v1/book/9781234/chapter/ch01.html"
                );
            }
            other => panic!("expected chapters, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn book_follows_paginated_chapter_listing() {
        let fetch = FakeFetch::default()
            .with(
                "https://host/api/v2/book/9781234/",
                r#"{"title": "Learning Rust", "format": "book", "chapters_url": "https://host/api/v2/book/9781234/chapters/"}"#,
            )
            .with(
                "https://host/api/v2/book/9781234/chapters/",
                r#"{"next": "https://host/api/v2/book/9781234/chapters/?page=2", "results": [{"url": "https://host/c/1"}]}"#,
            )
            .with(
                "https://host/api/v2/book/9781234/chapters/?page=2",
                r#"{"next": null, "results": [{"web_url": "https://host/c/2"}]}"#,
            );

        let resolution = Resolver::new(&fetch)
            .resolve(&url(BOOK_URL), ContentKind::Book)
            .await
            .unwrap();
        assert_eq!(resolution.title.as_deref(), Some("Learning Rust"));
        match resolution.content {
            Content::Chapters(chapters) => {
                let urls: Vec<_> = chapters.iter().map(|c| c.url.as_str()).collect();
                assert_eq!(urls, vec!["https://host/c/1", "https://host/c/2"]);
            }
            other => panic!("expected chapters, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn book_without_any_chapters_is_an_error() {
        let fetch = FakeFetch::default().with(BOOK_URL, "<p>nothing</p>");
        let result = Resolver::new(&fetch)
            .resolve(&url(BOOK_URL), ContentKind::Book)
            .await;
        assert!(matches!(result, Err(OrlyError::Resolution(_))));
    }

    #[tokio::test]
    async fn unreachable_course_toc_passes_through() {
        let fetch = FakeFetch::default();
        let entry = url("https://host/course/x/ABC123/");
        let resolution = Resolver::new(&fetch)
            .resolve(&entry, ContentKind::Course)
            .await
            .unwrap();
        assert!(matches!(resolution.content, Content::PassThrough(_)));
    }

    #[tokio::test]
    async fn malformed_course_toc_is_an_error() {
        let fetch = FakeFetch::default().with("https://host/api/v1/book/ABC123/toc/", "{\"oops\": 1}");
        let result = Resolver::new(&fetch)
            .resolve(&url("https://host/course/x/ABC123/"), ContentKind::Course)
            .await;
        assert!(matches!(result, Err(OrlyError::Resolution(_))));
    }
}
