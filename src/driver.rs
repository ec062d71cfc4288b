use std::{future::Future, io::Write, path::PathBuf, time::Duration};

use anyhow::Context;
use log::{error, info, warn};
use reqwest::Url;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use crate::{
    client::Fetch,
    dispatcher::MediaDispatcher,
    error::{OrlyError, Result},
    fetcher::ChapterFetcher,
    naming::{
        chapter_path, lesson_path, passthrough_template, sanitize_or, UNKNOWN_BOOK, UNKNOWN_COURSE,
    },
    toc::{Content, ContentKind, ModuleGrouping, Resolver, ResourceDescriptor},
    Outcome,
};

const QUIT: &str = "q";

/// Line based questions on top of any async reader, stdin in practice.
pub struct Prompt<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> Prompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Trimmed answer, `None` once the input is exhausted.
    pub async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{}", question);
        std::io::stdout().flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }

    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(matches!(self.ask(question).await?, Some(answer) if answer.eq_ignore_ascii_case("y")))
    }
}

/// Drives `session` to completion unless `interrupt` fires first. The session
/// is dropped before this returns, which kills a running downloader.
pub async fn until_interrupted<T>(
    session: impl Future<Output = T>,
    interrupt: impl Future,
) -> Option<T> {
    tokio::select! {
        output = session => Some(output),
        _ = interrupt => None,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    fn record(&mut self, result: &Result<Outcome>) {
        match result {
            Ok(Outcome::Downloaded) => self.downloaded += 1,
            Ok(Outcome::Skipped) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Resolves every entered url and downloads what it points to, one resource
/// at a time.
pub struct Driver<'a, F> {
    kind: ContentKind,
    output: PathBuf,
    resolver: Resolver<'a, F>,
    fetcher: ChapterFetcher<'a, F>,
    dispatcher: MediaDispatcher,
}

impl<'a, F: Fetch> Driver<'a, F> {
    pub fn new(
        fetch: &'a F,
        kind: ContentKind,
        output: impl Into<PathBuf>,
        delay: Duration,
        dispatcher: MediaDispatcher,
    ) -> Self {
        Self {
            kind,
            output: output.into(),
            resolver: Resolver::new(fetch),
            fetcher: ChapterFetcher::new(fetch, delay),
            dispatcher,
        }
    }

    /// Prompts for urls until the user quits. Returns how many were processed.
    pub async fn run_interactive<R: AsyncRead + Unpin>(
        &self,
        prompt: &mut Prompt<R>,
    ) -> Result<usize> {
        let question = match self.kind {
            ContentKind::Book => "\nEnter Book URL (or 'q' to quit): ",
            ContentKind::Course => "\nEnter Course URL (or 'q' to quit): ",
        };

        let mut processed = 0;
        while let Some(input) = prompt.ask(question).await? {
            if input.eq_ignore_ascii_case(QUIT) {
                break;
            }
            if input.is_empty() {
                continue;
            }
            self.process(&input).await;
            processed += 1;
        }
        Ok(processed)
    }

    pub async fn run_batch(&self, urls: &[String]) {
        for url in urls {
            self.process(url).await;
        }
    }

    /// Handles a single entered url. Failures are logged, never propagated.
    pub async fn process(&self, input: &str) -> Option<Tally> {
        info!("Processing: {}", input);
        match self.try_process(input).await {
            Ok(tally) => Some(tally),
            Err(err) => {
                error!("{}", err);
                None
            }
        }
    }

    async fn try_process(&self, input: &str) -> Result<Tally> {
        let url = Url::parse(input.trim()).with_context(|| format!("Invalid url: {}", input))?;
        let resolution = self.resolver.resolve(&url, self.kind).await?;
        info!("Found {} resources", resolution.resource_count());

        let title = resolution.title.as_deref();
        match resolution.content {
            Content::Chapters(chapters) => Ok(self.download_book(title, &chapters).await),
            Content::Modules(modules) => self.download_course(title, &modules).await,
            Content::PassThrough(unit) => match self.kind {
                ContentKind::Book => {
                    Ok(self.download_book(title, std::slice::from_ref(&unit)).await)
                }
                ContentKind::Course => {
                    let template = passthrough_template(&self.output);
                    let result = self
                        .dispatcher
                        .dispatch_template(&unit.url, &template)
                        .await
                        .map(|_| Outcome::Downloaded);
                    let mut tally = Tally::default();
                    tally.record(&result);
                    result?;
                    Ok(tally)
                }
            },
        }
    }

    async fn download_book(&self, title: Option<&str>, chapters: &[ResourceDescriptor]) -> Tally {
        let title = sanitize_or(title, || UNKNOWN_BOOK.to_string());
        info!(
            "Downloading '{}' to {}",
            title,
            self.output.join(&title).display()
        );

        let mut tally = Tally::default();
        for chapter in chapters {
            info!(
                "Downloading chapter {}/{}: {}",
                chapter.position,
                chapters.len(),
                chapter.url
            );
            let path = chapter_path(&self.output, &title, chapter.position);
            let result = self.fetcher.save_chapter(chapter, &path).await;
            match &result {
                Ok(Outcome::Skipped) => info!("Skipping (exists): {}", path.display()),
                Ok(Outcome::Downloaded) => (),
                Err(err) => error!("Failed to download chapter {}: {}", chapter.url, err),
            }
            tally.record(&result);
        }

        info!(
            "Book '{}' done: {} downloaded, {} skipped, {} failed",
            title, tally.downloaded, tally.skipped, tally.failed
        );
        tally
    }

    async fn download_course(&self, title: Option<&str>, modules: &[ModuleGrouping]) -> Result<Tally> {
        let title = sanitize_or(title, || UNKNOWN_COURSE.to_string());
        info!("Course Title: {}", title);

        let mut tally = Tally::default();
        for module in modules {
            info!(
                "--- Module {}/{}: {} ---",
                module.position,
                modules.len(),
                module.label
            );
            for lesson in &module.lessons {
                let path = lesson_path(
                    &self.output,
                    &title,
                    module.position,
                    &module.label,
                    lesson.position,
                    &lesson.label,
                );
                let result = match self.dispatcher.dispatch(lesson, &path).await {
                    // No point in trying the remaining lessons
                    Err(err @ OrlyError::DownloaderMissing(_)) => return Err(err),
                    result => result,
                };
                match &result {
                    Ok(Outcome::Skipped) => info!("Skipping (exists): {}", path.display()),
                    Ok(Outcome::Downloaded) => (),
                    Err(err) => error!("Failed to download {}: {}", lesson.label, err),
                }
                tally.record(&result);
            }
        }

        if tally.failed > 0 {
            warn!(
                "Course '{}' finished with {} failed lessons, run again to retry them",
                title, tally.failed
            );
        } else {
            info!("Course '{}' download complete!", title);
        }
        Ok(tally)
    }
}
