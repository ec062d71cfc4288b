use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::Url;

use crate::{
    client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT},
    dispatcher::DEFAULT_DOWNLOADER,
    toc::ContentKind,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory everything is mirrored into
    #[arg(short, long, default_value = "Downloads", global = true)]
    pub output: PathBuf,

    /// Netscape cookie file, defaults to cookie.txt or cookies.txt in the current directory
    #[arg(short, long, global = true)]
    pub cookies: Option<PathBuf>,

    /// External program used to download videos
    #[arg(long, default_value = DEFAULT_DOWNLOADER, global = true)]
    pub downloader: String,

    /// Seconds to wait after every chapter request
    #[arg(long, default_value_t = 1, global = true)]
    pub delay: u64,

    #[arg(long, default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: Url,

    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save book chapters as html files
    Book {
        /// Book urls, prompts for them when omitted
        urls: Vec<String>,
    },
    /// Download video course lessons
    Course {
        /// Course urls, prompts for them when omitted
        urls: Vec<String>,
    },
}

impl Command {
    pub fn kind(&self) -> ContentKind {
        match self {
            Command::Book { .. } => ContentKind::Book,
            Command::Course { .. } => ContentKind::Course,
        }
    }

    pub fn urls(&self) -> &[String] {
        match self {
            Command::Book { urls } | Command::Course { urls } => urls,
        }
    }
}
