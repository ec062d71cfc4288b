use std::path::{Path, PathBuf};

pub const UNKNOWN_COURSE: &str = "Unknown Course";
pub const UNKNOWN_BOOK: &str = "Unknown_Book";
pub const MISC_MODULE: &str = "Introduction_or_Misc";

const VIDEO_EXTENSION: &str = "mp4";

/// Strips characters that are illegal in file names on common filesystems,
/// then trims surrounding whitespace.
pub fn sanitize(title: &str) -> String {
    sanitize_filename::sanitize(title).trim().to_string()
}

/// Sanitized title, or `fallback` if nothing is left of it.
pub fn sanitize_or(title: Option<&str>, fallback: impl FnOnce() -> String) -> String {
    match title.map(sanitize) {
        Some(title) if !title.is_empty() => title,
        _ => fallback(),
    }
}

/// `<base>/<course>/<mm> - <module>/<ll> - <lesson>.mp4`
pub fn lesson_path(
    base: &Path,
    course_title: &str,
    module_position: usize,
    module_label: &str,
    lesson_position: usize,
    lesson_label: &str,
) -> PathBuf {
    base.join(course_title)
        .join(format!("{:02} - {}", module_position, module_label))
        .join(format!(
            "{:02} - {}.{}",
            lesson_position, lesson_label, VIDEO_EXTENSION
        ))
}

/// `<base>/<book>/<nnn>_chapter.html`
pub fn chapter_path(base: &Path, book_title: &str, position: usize) -> PathBuf {
    base.join(book_title)
        .join(format!("{:03}_chapter.html", position))
}

/// Output template handed to the downloader when we know nothing about the
/// structure of a course and let it fill in the names.
pub fn passthrough_template(base: &Path) -> String {
    format!(
        "{}/%(playlist)s/%(chapter_number)s - %(chapter)s/%(playlist_index)s - %(title)s.%(ext)s",
        base.display()
    )
}
