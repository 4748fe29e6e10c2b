//! Console rendering of unlocked capsules.
//!
//! Text is printed to stdout. Photos and videos are either exported to a
//! directory or written to a wiped temp file and handed to the platform
//! viewer; the temp file lives until the user confirms they are done.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use dialoguer::Input;

use capsule_core::secure_temp::SecureTempFile;
use capsule_core::storage::ContentType;
use capsule_core::{CapsuleError, ContentDisplay};

use crate::ui::{self, Badge, UiContext};

/// Environment variable overriding the media viewer command.
pub const OPENER_ENV: &str = "TIMECAPSULE_OPENER";

pub struct ConsoleDisplay {
    ui: UiContext,
    export_dir: Option<PathBuf>,
    interactive: bool,
    exported: Vec<PathBuf>,
}

impl ConsoleDisplay {
    pub fn new(ui: UiContext, export_dir: Option<PathBuf>, interactive: bool) -> Self {
        Self {
            ui,
            export_dir,
            interactive,
            exported: Vec::new(),
        }
    }

    /// Files written to the export directory so far.
    pub fn exported(&self) -> &[PathBuf] {
        &self.exported
    }

    fn show_text(&self, plaintext: &[u8], title: &str) -> io::Result<()> {
        let text = String::from_utf8_lossy(plaintext);
        if self.ui.mode.is_json() {
            // JSON reports carry ids only; the message still goes to stderr.
            eprintln!("{}\n{}", title, text);
            return Ok(());
        }

        let mut out = io::stdout().lock();
        writeln!(out, "{}", ui::badge(&self.ui, Badge::Ok, title))?;
        writeln!(out, "{}", text)?;
        out.flush()
    }

    fn show_media(
        &mut self,
        content_type: ContentType,
        plaintext: &[u8],
        title: &str,
    ) -> capsule_core::Result<()> {
        if let Some(dir) = self.export_dir.clone() {
            let path = export_media(&dir, content_type, plaintext, title)
                .map_err(|e| CapsuleError::Display(format!("Export failed: {}", e)))?;
            self.ui.say(&ui::badge(
                &self.ui,
                Badge::Ok,
                &format!("{} exported to {}", title, path.display()),
            ));
            self.exported.push(path);
            return Ok(());
        }

        if !self.interactive {
            return Err(CapsuleError::Display(format!(
                "cannot show {} without a terminal; pass --export-dir",
                content_type
            )));
        }

        let temp = SecureTempFile::create(plaintext, media_extension(content_type))?;
        launch_viewer(temp.path())
            .map_err(|e| CapsuleError::Display(format!("Failed to launch viewer: {}", e)))?;

        Input::<String>::new()
            .with_prompt(format!("Viewing \"{}\". Press Enter when done", title))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CapsuleError::Display(e.to_string()))?;
        drop(temp);
        Ok(())
    }
}

impl ContentDisplay for ConsoleDisplay {
    fn show(
        &mut self,
        content_type: ContentType,
        plaintext: &[u8],
        title: &str,
    ) -> capsule_core::Result<()> {
        match content_type {
            ContentType::Text => self
                .show_text(plaintext, title)
                .map_err(|e| CapsuleError::Display(e.to_string())),
            ContentType::Photo | ContentType::Video => {
                self.show_media(content_type, plaintext, title)
            }
        }
    }
}

fn media_extension(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Text => ".txt",
        ContentType::Photo => ".jpg",
        ContentType::Video => ".mp4",
    }
}

fn viewer_command() -> String {
    if let Ok(value) = std::env::var(OPENER_ENV) {
        if !value.trim().is_empty() {
            return value;
        }
    }
    if cfg!(target_os = "macos") {
        "open".to_string()
    } else {
        "xdg-open".to_string()
    }
}

fn launch_viewer(path: &Path) -> io::Result<()> {
    let status = Command::new(viewer_command())
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("viewer exited with {}", status)))
    }
}

/// File-name-safe version of a capsule title.
fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "capsule".to_string()
    } else {
        stem
    }
}

/// Write `plaintext` to a new file in `dir`, never overwriting.
fn export_media(
    dir: &Path,
    content_type: ContentType,
    plaintext: &[u8],
    title: &str,
) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let stem = file_stem(title);
    let extension = media_extension(content_type);

    for attempt in 0..1000u32 {
        let name = if attempt == 0 {
            format!("{}{}", stem, extension)
        } else {
            format!("{}-{}{}", stem, attempt, extension)
        };
        let path = dir.join(name);

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        match options.open(&path) {
            Ok(mut file) => {
                file.write_all(plaintext)?;
                file.sync_all()?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("too many exports named {} in {}", stem, dir.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_sanitizes() {
        assert_eq!(file_stem("Summer trip/2025"), "Summer_trip_2025");
        assert_eq!(file_stem("   "), "capsule");
        assert_eq!(file_stem("ok-name_1"), "ok-name_1");
    }

    #[test]
    fn test_export_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();

        let first = export_media(dir.path(), ContentType::Photo, b"one", "pic").unwrap();
        let second = export_media(dir.path(), ContentType::Photo, b"two", "pic").unwrap();

        assert_eq!(first.file_name().unwrap(), "pic.jpg");
        assert_eq!(second.file_name().unwrap(), "pic-1.jpg");
        assert_eq!(std::fs::read(first).unwrap(), b"one");
        assert_eq!(std::fs::read(second).unwrap(), b"two");
    }

    #[test]
    fn test_media_without_terminal_or_export_dir_fails() {
        let mut display = ConsoleDisplay::new(UiContext::plain(), None, false);
        let result = display.show(ContentType::Video, b"frames", "clip");
        assert!(matches!(result, Err(CapsuleError::Display(_))));
    }

    #[test]
    fn test_media_export_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut display =
            ConsoleDisplay::new(UiContext::plain(), Some(dir.path().to_path_buf()), false);

        display.show(ContentType::Video, b"frames", "clip").unwrap();

        assert_eq!(display.exported().len(), 1);
        assert_eq!(std::fs::read(&display.exported()[0]).unwrap(), b"frames");
    }
}
