//! The vault: a directory of Markdown notes.
//!
//! Paths handed in and out are vault-relative and always use `/`.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use serde_yaml::Mapping;
use tokio::fs;

use crate::error::{BaseCalError, BaseCalResult};
use crate::frontmatter::{parse_note, render_note};

/// Name of the vault's metadata directory (settings, cache).
pub const META_DIR: &str = ".basecal";

const TRASH_DIR: &str = ".trash";

/// A note loaded from the vault.
#[derive(Debug, Clone)]
pub struct Note {
    /// Vault-relative path, e.g. `Meetings/Standup.md`.
    pub path: String,
    pub frontmatter: Mapping,
    pub body: String,
    pub modified: Option<DateTime<Local>>,
    pub created: Option<DateTime<Local>>,
}

impl Note {
    /// File name without extension.
    pub fn basename(&self) -> &str {
        let name = self.name();
        name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
    }

    /// File name with extension.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Parent folder, empty for the vault root.
    pub fn folder(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    pub fn extension(&self) -> &str {
        self.name().rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn open(root: impl Into<PathBuf>) -> BaseCalResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(BaseCalError::Config(format!(
                "Vault directory not found: {}",
                root.display()
            )));
        }
        // Watcher events carry canonical paths.
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        Ok(Vault { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    /// Absolute path for a vault-relative path. Rejects paths escaping the vault.
    pub fn resolve(&self, rel: &str) -> BaseCalResult<PathBuf> {
        let rel_path = Path::new(rel.trim_start_matches('/'));
        let escapes = rel_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(BaseCalError::Config(format!(
                "Path '{}' is outside the vault",
                rel
            )));
        }
        Ok(self.root.join(rel_path))
    }

    /// Vault-relative form of an absolute path inside the vault.
    pub fn relative(&self, abs: &Path) -> Option<String> {
        let rel = abs.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Some(parts.join("/"))
    }

    pub async fn exists(&self, rel: &str) -> bool {
        match self.resolve(rel) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    pub async fn is_file(&self, rel: &str) -> bool {
        match self.resolve(rel) {
            Ok(path) => fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false),
            Err(_) => false,
        }
    }

    pub async fn is_folder(&self, rel: &str) -> bool {
        match self.resolve(rel) {
            Ok(path) => fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// All `.md` files below the root, sorted, skipping hidden directories.
    pub async fn list_markdown(&self) -> BaseCalResult<Vec<String>> {
        let mut out = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|e| e == "md") {
                    out.extend(self.relative(&path));
                }
            }
        }

        out.sort();
        Ok(out)
    }

    pub async fn read(&self, rel: &str) -> BaseCalResult<String> {
        let path = self.resolve(rel)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BaseCalError::NoteNotFound(rel.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn load_note(&self, rel: &str) -> BaseCalResult<Note> {
        let content = self.read(rel).await?;
        let (frontmatter, body) = parse_note(rel, &content)?;

        let metadata = fs::metadata(self.resolve(rel)?).await.ok();
        let modified = metadata
            .as_ref()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Local>::from);
        let created = metadata
            .as_ref()
            .and_then(|m| m.created().ok())
            .map(DateTime::<Local>::from);

        Ok(Note {
            path: rel.to_string(),
            frontmatter,
            body,
            modified,
            created,
        })
    }

    /// Create a new file. Never overwrites an existing one.
    pub async fn create(&self, rel: &str, content: &str) -> BaseCalResult<()> {
        let path = self.resolve(rel)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        let mut file = match file {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(BaseCalError::NoteExists(rel.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        use tokio::io::AsyncWriteExt;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Scoped frontmatter transaction.
    ///
    /// Reads the note, hands its frontmatter to `mutate`, and atomically
    /// replaces the file with the result. Readers never observe a partially
    /// applied update.
    pub async fn process_frontmatter<F>(&self, rel: &str, mutate: F) -> BaseCalResult<()>
    where
        F: FnOnce(&mut Mapping),
    {
        let path = self.resolve(rel)?;
        let content = self.read(rel).await?;
        let (mut frontmatter, body) = parse_note(rel, &content)?;

        mutate(&mut frontmatter);

        let updated = render_note(&frontmatter, &body)?;
        write_atomic(&path, &updated).await
    }

    /// Move a note into the vault trash folder.
    pub async fn trash(&self, rel: &str) -> BaseCalResult<String> {
        let source = self.resolve(rel)?;
        if !fs::try_exists(&source).await.unwrap_or(false) {
            return Err(BaseCalError::NoteNotFound(rel.to_string()));
        }

        let name = rel.rsplit('/').next().unwrap_or(rel);
        let trash_dir = self.root.join(TRASH_DIR);
        fs::create_dir_all(&trash_dir).await?;

        let mut target = trash_dir.join(name);
        let mut n = 1;
        while fs::try_exists(&target).await.unwrap_or(false) {
            target = trash_dir.join(format!("{} {}", n, name));
            n += 1;
        }

        fs::rename(&source, &target).await?;
        Ok(self
            .relative(&target)
            .unwrap_or_else(|| format!("{}/{}", TRASH_DIR, name)))
    }
}

/// Write to a sibling temp file, then rename over the target.
async fn write_atomic(path: &Path, content: &str) -> BaseCalResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.basecal-tmp", file_name));

    fs::write(&tmp, content).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}
