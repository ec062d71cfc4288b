use serde::Deserialize;

/// Response of `api/v{1,2}/book/<id>/`. Both versions share the fields we need.
#[derive(Deserialize, Debug, Default)]
pub struct BookMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub chapters_url: Option<String>,
    #[serde(default)]
    pub chapters: Option<Vec<ChapterRef>>,
}

impl BookMetadata {
    pub fn is_video(&self) -> bool {
        self.format.as_deref() == Some("video")
    }
}

/// A chapter reference, either a bare url or a chapter object.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChapterRef {
    Url(String),
    Entry {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        web_url: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl ChapterRef {
    /// `web_url` wins over `url`
    pub fn link(&self) -> Option<&str> {
        match self {
            ChapterRef::Url(url) => Some(url.as_str()),
            ChapterRef::Entry { web_url, url, .. } => web_url
                .as_deref()
                .or(url.as_deref())
                .filter(|link| !link.is_empty()),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ChapterRef::Url(_) => None,
            ChapterRef::Entry { title, .. } => title.as_deref(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ChaptersResponse {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<ChapterRef>,
}

/// Node of `api/v1/book/<id>/toc/`.
#[derive(Deserialize, Debug, Clone)]
pub struct TocElement {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<TocElement>>,
}

impl TocElement {
    pub fn children(&self) -> &[TocElement] {
        self.children.as_deref().unwrap_or_default()
    }
}
