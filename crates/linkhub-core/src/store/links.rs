use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::LinkRecord;

use super::{check_upload_name, managed_icon_name, public_icon_path, DeleteOutcome, LinkStore};

/// Links kept one per line in a text file, icons as plain files next to it.
#[derive(Debug, Clone)]
pub struct FileLinkStore {
    links_file: PathBuf,
    images_dir: PathBuf,
}

impl FileLinkStore {
    pub fn new(links_file: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            links_file: links_file.into(),
            images_dir: images_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.links_file(), config.images_dir())
    }

    pub fn links_file(&self) -> &Path {
        &self.links_file
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    fn create_empty(&self) -> io::Result<()> {
        if let Some(parent) = self.links_file.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.links_file)?;
        Ok(())
    }

    fn rewrite(&self, records: &[LinkRecord]) -> io::Result<()> {
        let mut contents = records
            .iter()
            .map(LinkRecord::to_line)
            .collect::<Vec<_>>()
            .join("\n");
        if !records.is_empty() {
            contents.push('\n');
        }
        fs::write(&self.links_file, contents)
    }
}

impl LinkStore for FileLinkStore {
    fn list(&self) -> Vec<LinkRecord> {
        match fs::read_to_string(&self.links_file) {
            Ok(contents) => contents.lines().filter_map(LinkRecord::parse_line).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if let Err(e) = self.create_empty() {
                    warn!(path = %self.links_file.display(), error = %e, "Failed to create links file");
                }
                Vec::new()
            }
            Err(e) => {
                error!(path = %self.links_file.display(), error = %e, "Failed to read links file");
                Vec::new()
            }
        }
    }

    fn append(&self, record: &LinkRecord) -> io::Result<()> {
        if let Some(parent) = self.links_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = record.to_line();
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.links_file)?;
        file.write_all(line.as_bytes())?;
        debug!(id = %record.id, "Appended link");
        Ok(())
    }

    fn delete_by_id(&self, id: &str) -> io::Result<DeleteOutcome> {
        let current = self.list();
        let Some(deleted) = current.iter().find(|r| r.id == id).cloned() else {
            if !current.is_empty() {
                warn!(id, "Link not found for deletion");
            }
            return Ok(DeleteOutcome::NotFound);
        };

        let survivors: Vec<LinkRecord> = current.into_iter().filter(|r| r.id != id).collect();
        self.rewrite(&survivors)?;
        debug!(id, remaining = survivors.len(), "Deleted link");
        Ok(DeleteOutcome::Deleted(deleted))
    }

    fn delete_icon_file(&self, icon_path: &str) -> bool {
        let Some(name) = managed_icon_name(icon_path) else {
            return false;
        };
        let path = self.images_dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Deleted icon file");
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Icon file not found for deletion, or already deleted");
                false
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to delete icon file");
                false
            }
        }
    }

    fn save_uploaded_file(&self, bytes: &[u8], file_name: &str) -> io::Result<String> {
        check_upload_name(file_name)?;
        fs::create_dir_all(&self.images_dir)?;
        fs::write(self.images_dir.join(file_name), bytes)?;
        Ok(public_icon_path(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};
    use rstest::{fixture, rstest};

    struct LinkStoreCtx {
        tmp: TempDir,
        store: FileLinkStore,
    }

    impl LinkStoreCtx {
        fn new() -> Self {
            let tmp = tempdir().unwrap();
            let store = FileLinkStore::new(
                tmp.path().join("public/data/links.txt"),
                tmp.path().join("public/images"),
            );
            Self { tmp, store }
        }

        fn raw(&self) -> String {
            fs::read_to_string(self.store.links_file()).unwrap()
        }

        fn write_raw(&self, contents: &str) {
            fs::create_dir_all(self.store.links_file().parent().unwrap()).unwrap();
            fs::write(self.store.links_file(), contents).unwrap();
        }
    }

    #[fixture]
    fn ctx() -> LinkStoreCtx {
        LinkStoreCtx::new()
    }

    fn record(id: &str, name: &str) -> LinkRecord {
        LinkRecord::new(id, name, format!("https://{}.example.com", name.to_lowercase()), "")
    }

    #[rstest]
    fn list_missing_file_creates_it(ctx: LinkStoreCtx) {
        assert!(!ctx.store.links_file().exists());
        assert!(ctx.store.list().is_empty());
        assert!(ctx.store.links_file().exists());
        assert_eq!(ctx.raw(), "");
    }

    #[rstest]
    fn unreadable_links_file_reads_as_empty(ctx: LinkStoreCtx) {
        // A directory where the file should be: read fails with something
        // other than NotFound.
        fs::create_dir_all(ctx.store.links_file()).unwrap();

        assert!(ctx.store.list().is_empty());
        assert_eq!(ctx.store.delete_by_id("1").unwrap(), DeleteOutcome::NotFound);
        assert!(ctx.store.links_file().is_dir());
    }

    #[rstest]
    fn append_then_list_preserves_order(ctx: LinkStoreCtx) {
        let records: Vec<_> = ["Mail", "Wiki", "Calendar", "Git"]
            .iter()
            .enumerate()
            .map(|(i, name)| record(&i.to_string(), name))
            .collect();
        for r in &records {
            ctx.store.append(r).unwrap();
        }
        assert_eq!(ctx.store.list(), records);
        assert!(ctx.raw().ends_with('\n'));
    }

    #[rstest]
    fn append_does_not_touch_existing_lines(ctx: LinkStoreCtx) {
        ctx.write_raw("1 | Odd | https://odd.example |   \n\n");
        ctx.store.append(&record("2", "Mail")).unwrap();
        assert_eq!(
            ctx.raw(),
            "1 | Odd | https://odd.example |   \n\n2 | Mail | https://mail.example.com | \n"
        );
    }

    #[rstest]
    fn list_skips_blank_lines(ctx: LinkStoreCtx) {
        ctx.write_raw("\n1 | A | https://a.example | \n   \n2 | B | https://b.example | /images/b.png\n\n");
        let ids: Vec<_> = ctx.store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[rstest]
    fn list_tolerates_short_lines(ctx: LinkStoreCtx) {
        ctx.write_raw("7 | Half\n");
        let links = ctx.store.list();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "Half");
        assert_eq!(links[0].url, "#");
        assert_eq!(links[0].icon_path, "");
    }

    #[rstest]
    fn delete_removes_record_and_keeps_order(ctx: LinkStoreCtx) {
        for (id, name) in [("1", "A"), ("2", "B"), ("3", "C")] {
            ctx.store.append(&record(id, name)).unwrap();
        }

        let outcome = ctx.store.delete_by_id("2").unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted(record("2", "B")));

        let ids: Vec<_> = ctx.store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["1", "3"]);
        assert!(ctx.raw().ends_with('\n'));
    }

    #[rstest]
    fn delete_last_record_leaves_empty_file(ctx: LinkStoreCtx) {
        ctx.store.append(&record("1", "A")).unwrap();
        assert!(ctx.store.delete_by_id("1").unwrap().is_deleted());
        assert_eq!(ctx.raw(), "");
        assert!(ctx.store.list().is_empty());
    }

    #[rstest]
    fn delete_unknown_id_leaves_file_unchanged(ctx: LinkStoreCtx) {
        let original = "1 | A | https://a.example | \n\n2 | B | https://b.example | \n";
        ctx.write_raw(original);
        assert_eq!(ctx.store.delete_by_id("99").unwrap(), DeleteOutcome::NotFound);
        assert_eq!(ctx.raw(), original);
    }

    #[rstest]
    fn delete_on_empty_store_is_not_found(ctx: LinkStoreCtx) {
        assert_eq!(ctx.store.delete_by_id("1").unwrap(), DeleteOutcome::NotFound);
    }

    #[rstest]
    fn delete_reports_icon_path(ctx: LinkStoreCtx) {
        ctx.store
            .append(&LinkRecord::new("1", "A", "https://a.example", "/images/1-a.png"))
            .unwrap();
        let outcome = ctx.store.delete_by_id("1").unwrap();
        assert_eq!(outcome.icon_path(), Some("/images/1-a.png"));
    }

    #[rstest]
    fn save_uploaded_file_returns_public_path(ctx: LinkStoreCtx) {
        let path = ctx.store.save_uploaded_file(b"png-bytes", "1-logo.png").unwrap();
        assert_eq!(path, "/images/1-logo.png");
        let on_disk = ctx.tmp.path().join("public/images/1-logo.png");
        assert_eq!(fs::read(on_disk).unwrap(), b"png-bytes");
    }

    #[rstest]
    fn save_uploaded_file_rejects_traversal(ctx: LinkStoreCtx) {
        let err = ctx.store.save_uploaded_file(b"x", "../escape.png").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!ctx.tmp.path().join("public/escape.png").exists());
    }

    #[rstest]
    fn delete_icon_file_removes_managed_upload(ctx: LinkStoreCtx) {
        let path = ctx.store.save_uploaded_file(b"x", "1-a.png").unwrap();
        assert!(ctx.store.delete_icon_file(&path));
        assert!(!ctx.store.images_dir().join("1-a.png").exists());
        // Second delete finds nothing and does not fail.
        assert!(!ctx.store.delete_icon_file(&path));
    }

    #[rstest]
    #[case("")]
    #[case("https://placehold.co/64x64.png")]
    #[case("/static/1-a.png")]
    #[case("1-a.png")]
    fn delete_icon_file_ignores_unmanaged_paths(ctx: LinkStoreCtx, #[case] icon_path: &str) {
        ctx.store.save_uploaded_file(b"x", "1-a.png").unwrap();
        assert!(!ctx.store.delete_icon_file(icon_path));
        assert!(ctx.store.images_dir().join("1-a.png").exists());
    }
}
