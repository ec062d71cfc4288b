use std::{
    ffi::OsStr,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{debug, info};
use reqwest::Url;
use tokio::process::Command;

use crate::{
    error::{OrlyError, Result},
    toc::ResourceDescriptor,
    Outcome,
};

pub const DEFAULT_DOWNLOADER: &str = "yt-dlp";

const FORMAT: &str = "bestvideo+bestaudio/best";
const CONTAINER: &str = "mp4";

/// Hands lessons over to an external video downloader.
pub struct MediaDispatcher {
    program: String,
    cookie_file: PathBuf,
}

impl MediaDispatcher {
    pub fn new(program: impl Into<String>, cookie_file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cookie_file: cookie_file.into(),
        }
    }

    fn command<O: AsRef<OsStr>>(&self, output: O, url: &Url) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--cookies")
            .arg(&self.cookie_file)
            .arg("-o")
            .arg(output)
            .args(["--format", FORMAT])
            .args(["--merge-output-format", CONTAINER])
            .arg("--embed-metadata")
            .arg(url.as_str())
            .kill_on_drop(true);
        command
    }

    async fn run(&self, mut command: Command) -> Result<()> {
        debug!("Running {:?}", command);
        let status = match command.status().await {
            Ok(status) => status,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(OrlyError::DownloaderMissing(self.program.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        if !status.success() {
            return Err(OrlyError::DownloaderFailed(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }

    /// Checks that the downloader can be started at all.
    pub async fn probe(&self) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .arg("--version")
            .stdout(std::process::Stdio::null())
            .kill_on_drop(true);
        self.run(command).await
    }

    /// Downloads `lesson` into `output`. An existing file counts as done.
    pub async fn dispatch(&self, lesson: &ResourceDescriptor, output: &Path) -> Result<Outcome> {
        if tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Ok(Outcome::Skipped);
        }

        let created = match output.parent() {
            Some(parent) if !tokio::fs::try_exists(parent).await.unwrap_or(false) => {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Unable to create {}", parent.display()))?;
                Some(parent)
            }
            _ => None,
        };

        info!("Downloading: {}", lesson.label);
        if let Err(err) = self.run(self.command(output, &lesson.url)).await {
            if let Some(parent) = created {
                // Fails, and keeps the directory, once the downloader left partial files in it
                if let Err(cleanup) = tokio::fs::remove_dir(parent).await {
                    debug!("Keeping {}: {}", parent.display(), cleanup);
                }
            }
            return Err(err);
        }
        Ok(Outcome::Downloaded)
    }

    /// Lets the downloader name everything itself using an output template.
    pub async fn dispatch_template(&self, url: &Url, template: &str) -> Result<()> {
        self.run(self.command(template, url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::ResourceKind;

    const MISSING: &str = "orly-mirror-no-such-downloader";

    fn lesson() -> ResourceDescriptor {
        ResourceDescriptor {
            position: 1,
            label: "Welcome".to_string(),
            url: Url::parse("https://host/v/1").unwrap(),
            kind: ResourceKind::Lesson,
            parent_module: Some("Intro".to_string()),
        }
    }

    #[tokio::test]
    async fn existing_output_is_skipped_without_running() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("01 - Welcome.mp4");
        std::fs::write(&output, "video").unwrap();

        // A missing program proves nothing was spawned
        let dispatcher = MediaDispatcher::new(MISSING, "cookies.txt");
        for _ in 0..2 {
            let outcome = dispatcher.dispatch(&lesson(), &output).await.unwrap();
            assert_eq!(outcome, Outcome::Skipped);
        }
    }

    #[tokio::test]
    async fn missing_downloader_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("01 - Intro").join("01 - Welcome.mp4");

        let dispatcher = MediaDispatcher::new(MISSING, "cookies.txt");
        let result = dispatcher.dispatch(&lesson(), &output).await;
        assert!(matches!(result, Err(OrlyError::DownloaderMissing(ref p)) if p == MISSING));
        assert!(!output.parent().unwrap().exists());
        assert!(matches!(dispatcher.probe().await, Err(OrlyError::DownloaderMissing(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_decides_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("01 - Intro").join("01 - Welcome.mp4");

        let failing = MediaDispatcher::new("false", "cookies.txt");
        let result = failing.dispatch(&lesson(), &output).await;
        assert!(matches!(result, Err(OrlyError::DownloaderFailed(_))));
        assert!(!output.parent().unwrap().exists());

        let succeeding = MediaDispatcher::new("true", "cookies.txt");
        let outcome = succeeding.dispatch(&lesson(), &output).await.unwrap();
        assert_eq!(outcome, Outcome::Downloaded);
        assert!(output.parent().unwrap().is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_keeps_existing_module_directory() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("01 - Intro");
        std::fs::create_dir(&module).unwrap();
        let output = module.join("02 - Setup.mp4");

        let failing = MediaDispatcher::new("false", "cookies.txt");
        let result = failing.dispatch(&lesson(), &output).await;
        assert!(matches!(result, Err(OrlyError::DownloaderFailed(_))));
        assert!(module.is_dir());
    }
}
