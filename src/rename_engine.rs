use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result as AnyResult;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::collision::{ReservationSet, resolve, same_name, with_extension};
use crate::error::{EditError, RenameError, Result};
use crate::metadata::{DocumentKind, FormatExtractor, Metadata, MetadataExtractor, guess_from_filename};
use crate::sanitize::{DEFAULT_MAX_AUTHORS, clean_component, finish_base, format_authors, normalize_authors, sanitize};

#[derive(Debug, Clone)]
pub struct RenameConfig {
    pub directory: PathBuf,
    pub include_hidden: bool,
    pub guess_from_filename: bool,
    pub max_authors: usize,
}

/// A document found in the folder together with what was read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub original_path: PathBuf,
    pub kind: DocumentKind,
    pub extracted_author: Option<String>,
    pub extracted_title: Option<String>,
}

impl FileEntry {
    pub fn new(original_path: impl Into<PathBuf>, kind: DocumentKind, metadata: Option<Metadata>) -> Self {
        let metadata = metadata.unwrap_or_default();
        Self {
            original_path: original_path.into(),
            kind,
            extracted_author: metadata.author,
            extracted_title: metadata.title,
        }
    }

    pub fn file_name(&self) -> String {
        self.original_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension as written on disk, case preserved.
    pub fn extension(&self) -> String {
        self.original_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PlanStatus {
    Ready,
    NoMetadata,
    Unchanged,
    /// Dot-file listed for visibility but left alone unless hidden files
    /// are enabled.
    Hidden,
    Error(String),
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("Ready"),
            Self::NoMetadata => f.write_str("No metadata"),
            Self::Unchanged => f.write_str("Unchanged"),
            Self::Hidden => f.write_str("Hidden (skipped)"),
            Self::Error(reason) => write!(f, "Error: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub file: FileEntry,
    pub proposed_name: Option<String>,
    pub status: PlanStatus,
    /// Ready rows the user deselected in the preview stay on disk untouched.
    pub approved: bool,
}

impl PlanEntry {
    fn new(file: FileEntry, proposed_name: Option<String>, status: PlanStatus) -> Self {
        Self { file, proposed_name, status, approved: true }
    }

    pub fn will_rename(&self) -> bool {
        self.status == PlanStatus::Ready && self.approved && self.proposed_name.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    pub folder: PathBuf,
    pub entries: Vec<PlanEntry>,
    /// Every name in the folder when it was listed. Hand edits are checked
    /// against these.
    #[serde(skip)]
    pub existing_names: Vec<String>,
}

impl RenamePlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.entries.iter().filter(|e| e.will_rename()).count()
    }

    /// Flips approval of a Ready row. Returns the new state, or `None` when
    /// the row doesn't exist or isn't renameable.
    pub fn toggle_approval(&mut self, index: usize) -> Option<bool> {
        let entry = self.entries.get_mut(index)?;
        if entry.status != PlanStatus::Ready {
            return None;
        }
        entry.approved = !entry.approved;
        Some(entry.approved)
    }

    /// Replaces the proposal for row `index` with a name typed by the user
    /// and approves the row. Returns the final filename.
    ///
    /// The text is cleaned and truncated like extracted metadata. The file's
    /// extension is kept, and typing it is optional. The name must not
    /// match (ignoring case) another row's proposal or anything already in
    /// the folder other than the file itself.
    pub fn set_proposed_name(&mut self, index: usize, raw: &str) -> Result<String, EditError> {
        let entry = self.entries.get(index).ok_or(EditError::NoSuchEntry(index))?;
        if entry.status == PlanStatus::Hidden {
            return Err(EditError::Hidden);
        }

        let extension = entry.file.extension();
        let cleaned = clean_component(raw);
        let stem = clean_component(strip_extension(&cleaned, &extension));
        let base = finish_base(&stem).ok_or(EditError::Empty)?;
        let name = with_extension(&base, &extension);
        let current = entry.file.file_name();

        let unchanged = same_name(&name, &current);
        if !unchanged {
            let proposed_elsewhere = self
                .entries
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .filter_map(|(_, other)| other.proposed_name.as_deref());
            let on_disk = self.existing_names.iter().map(String::as_str).filter(|n| !same_name(n, &current));
            if proposed_elsewhere.chain(on_disk).any(|taken| same_name(taken, &name)) {
                return Err(EditError::Taken(name));
            }
        }

        let entry = &mut self.entries[index];
        entry.proposed_name = Some(name.clone());
        entry.status = if unchanged { PlanStatus::Unchanged } else { PlanStatus::Ready };
        entry.approved = true;
        info!(file = %current, to = %name, "proposal edited");
        Ok(name)
    }
}

fn strip_extension<'a>(name: &'a str, extension: &str) -> &'a str {
    if extension.is_empty() {
        return name;
    }
    let split = name.len().checked_sub(extension.len() + 1);
    match split {
        Some(at) if name.is_char_boundary(at) && same_name(&name[at..], &format!(".{}", extension)) => &name[..at],
        _ => name,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Renamed(PathBuf),
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub entry: PlanEntry,
    pub outcome: ExecutionOutcome,
}

/// Where a planning or renaming pass currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
    pub file_name: String,
}

/// Cooperative cancellation shared between the UI and a running pass.
/// Checked between files, never in the middle of one.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Turns extracted file entries into plan entries, owning the reservation
/// set for one planning pass.
#[derive(Debug)]
pub struct Planner {
    taken: ReservationSet,
    max_authors: usize,
}

impl Planner {
    /// `existing_names` must list everything already in the folder, not just
    /// the eligible documents.
    pub fn new<I, S>(existing_names: I, max_authors: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            taken: existing_names.into_iter().collect(),
            max_authors,
        }
    }

    pub fn classify(&mut self, file: FileEntry) -> PlanEntry {
        let author = file
            .extracted_author
            .as_deref()
            .and_then(normalize_authors)
            .map(|authors| format_authors(&authors, self.max_authors));

        let Some(base) = sanitize(author.as_deref(), file.extracted_title.as_deref()) else {
            return PlanEntry::new(file, None, PlanStatus::NoMetadata);
        };

        // A file never collides with its own current name.
        let current = file.file_name();
        let released = self.taken.release(&current);
        let proposed = resolve(&base, &file.extension(), &mut self.taken);

        if same_name(&proposed, &current) {
            PlanEntry::new(file, Some(proposed), PlanStatus::Unchanged)
        } else {
            // Keep the old name reserved: if this rename fails at execution
            // time the file is still there.
            if released {
                self.taken.reserve(&current);
            }
            PlanEntry::new(file, Some(proposed), PlanStatus::Ready)
        }
    }

    pub fn failed(file: FileEntry, reason: impl Into<String>) -> PlanEntry {
        PlanEntry::new(file, None, PlanStatus::Error(reason.into()))
    }

    pub fn hidden(file: FileEntry) -> PlanEntry {
        PlanEntry::new(file, None, PlanStatus::Hidden)
    }
}

/// Plans renames for files whose metadata has already been read.
pub fn plan_files<I, S>(folder: &Path, existing_names: I, files: Vec<FileEntry>, max_authors: usize) -> RenamePlan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let existing_names: Vec<String> = existing_names.into_iter().map(|n| n.as_ref().to_string()).collect();
    let mut planner = Planner::new(&existing_names, max_authors);
    RenamePlan {
        folder: folder.to_path_buf(),
        entries: files.into_iter().map(|file| planner.classify(file)).collect(),
        existing_names,
    }
}

#[derive(Clone)]
pub struct RenameEngine {
    config: RenameConfig,
    extractor: Arc<dyn MetadataExtractor>,
    cancel: CancelFlag,
}

impl fmt::Debug for RenameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameEngine")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RenameEngine {
    pub fn new(config: RenameConfig) -> Self {
        Self::with_extractor(config, Arc::new(FormatExtractor))
    }

    pub fn with_extractor(config: RenameConfig, extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self {
            config,
            extractor,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &RenameConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn plan(&self) -> Result<RenamePlan> {
        self.plan_with_progress(|_| {})
    }

    #[instrument(skip_all, fields(folder = %self.config.directory.display()))]
    pub fn plan_with_progress(&self, mut progress: impl FnMut(Progress)) -> Result<RenamePlan> {
        let folder = &self.config.directory;
        let listing = list_folder(folder)?;
        let total = listing.documents.len();
        let mut planner = Planner::new(&listing.all_names, self.config.max_authors);
        let mut entries = Vec::with_capacity(total);

        for (index, document) in listing.documents.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(planned = index, total, "planning cancelled");
                return Err(RenameError::Cancelled);
            }

            let ListedDocument { path, kind, hidden } = document;
            let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            progress(Progress { index, total, file_name });

            if hidden && !self.config.include_hidden {
                entries.push(Planner::hidden(FileEntry::new(path, kind, None)));
                continue;
            }

            let entry = match self.extractor.extract(&path, kind) {
                Ok(found) => {
                    let metadata = found.filter(|m| !m.is_empty()).or_else(|| self.guess(&path));
                    planner.classify(FileEntry::new(path, kind, metadata))
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "metadata extraction failed");
                    Planner::failed(FileEntry::new(path, kind, None), e.to_string())
                }
            };
            debug!(file = %entry.file.file_name(), status = %entry.status, proposed = ?entry.proposed_name, "planned");
            entries.push(entry);
        }

        let plan = RenamePlan { folder: folder.clone(), entries, existing_names: listing.all_names };
        info!(files = plan.len(), ready = plan.ready_count(), "plan complete");
        Ok(plan)
    }

    fn guess(&self, path: &Path) -> Option<Metadata> {
        if !self.config.guess_from_filename {
            return None;
        }
        guess_from_filename(path)
    }

    pub fn execute(&self, plan: &RenamePlan) -> Vec<ExecutionResult> {
        self.execute_with_progress(plan, |_| {})
    }

    /// Applies every approved Ready entry in order. Failures are recorded and
    /// the batch moves on; earlier renames are never rolled back.
    #[instrument(skip_all, fields(folder = %plan.folder.display()))]
    pub fn execute_with_progress(&self, plan: &RenamePlan, mut progress: impl FnMut(Progress)) -> Vec<ExecutionResult> {
        let total = plan.len();
        let mut results = Vec::with_capacity(total);

        for (index, entry) in plan.entries.iter().enumerate() {
            progress(Progress { index, total, file_name: entry.file.file_name() });

            let outcome = match &entry.proposed_name {
                Some(name) if entry.will_rename() && !self.cancel.is_cancelled() => {
                    match rename_file(&entry.file.original_path, &plan.folder.join(name)) {
                        Ok(target) => {
                            info!(from = %entry.file.file_name(), to = %name, "renamed");
                            ExecutionOutcome::Renamed(target)
                        }
                        Err(e) => {
                            warn!(file = %entry.file.file_name(), error = %e, "rename failed");
                            ExecutionOutcome::Failed(e.to_string())
                        }
                    }
                }
                _ => ExecutionOutcome::Skipped,
            };
            results.push(ExecutionResult { entry: entry.clone(), outcome });
        }

        if self.cancel.is_cancelled() {
            info!("execution cancelled; remaining entries skipped");
        }
        results
    }
}

fn rename_file(source: &Path, target: &Path) -> Result<PathBuf> {
    // fs::rename silently replaces an existing target on Unix.
    if target.symlink_metadata().is_ok() {
        return Err(RenameError::Conflict(target.to_path_buf()));
    }
    fs::rename(source, target).map_err(|e| RenameError::io(source, e))?;
    Ok(target.to_path_buf())
}

struct ListedDocument {
    path: PathBuf,
    kind: DocumentKind,
    hidden: bool,
}

struct FolderListing {
    /// Every entry name in the folder, used to seed the reservation set.
    all_names: Vec<String>,
    /// Eligible documents sorted by name, dot-files included.
    documents: Vec<ListedDocument>,
}

fn list_folder(folder: &Path) -> Result<FolderListing> {
    if !folder.is_dir() {
        return Err(RenameError::FolderNotFound(folder.to_path_buf()));
    }

    let mut all_names = Vec::new();
    let mut documents = Vec::new();
    for entry in fs::read_dir(folder).map_err(|e| RenameError::io(folder, e))? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let hidden = name.starts_with('.');
        all_names.push(name);

        // Follows symlinks, so a link to a document is planned like the
        // document itself. Renaming it renames the link.
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(kind) = DocumentKind::from_path(&path) {
            documents.push(ListedDocument { path, kind, hidden });
        }
    }

    documents.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    debug!(entries = all_names.len(), documents = documents.len(), "listed folder");
    Ok(FolderListing { all_names, documents })
}

/// One folder selection: the engine bound to that folder plus the plan and
/// results produced for it. Dropped when the user picks another folder.
#[derive(Debug)]
pub struct Session {
    engine: RenameEngine,
    plan: Option<RenamePlan>,
    results: Vec<ExecutionResult>,
}

impl Session {
    pub fn new(engine: RenameEngine) -> Self {
        Self { engine, plan: None, results: Vec::new() }
    }

    pub fn folder(&self) -> &Path {
        &self.engine.config().directory
    }

    pub fn engine(&self) -> &RenameEngine {
        &self.engine
    }

    pub fn plan(&self) -> Option<&RenamePlan> {
        self.plan.as_ref()
    }

    pub fn plan_mut(&mut self) -> Option<&mut RenamePlan> {
        self.plan.as_mut()
    }

    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    /// Re-reads the folder, replacing any previous plan and results.
    pub fn refresh(&mut self) -> Result<&RenamePlan> {
        let plan = self.engine.plan()?;
        Ok(self.set_plan(plan))
    }

    pub fn set_plan(&mut self, plan: RenamePlan) -> &RenamePlan {
        self.results.clear();
        self.plan.insert(plan)
    }

    /// Applies the current plan. The plan is consumed: after renames it no
    /// longer describes the folder.
    pub fn execute(&mut self) -> &[ExecutionResult] {
        if let Some(plan) = self.plan.take() {
            self.results = self.engine.execute(&plan);
        }
        &self.results
    }

    pub fn record_results(&mut self, results: Vec<ExecutionResult>) {
        self.plan = None;
        self.results = results;
    }
}

// Builder for rename configuration
pub struct ConfigBuilder {
    directory: Option<PathBuf>,
    include_hidden: bool,
    guess_from_filename: bool,
    max_authors: usize,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            directory: None,
            include_hidden: false,
            guess_from_filename: false,
            max_authors: DEFAULT_MAX_AUTHORS,
        }
    }

    pub fn directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.directory = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn guess_from_filename(mut self, guess: bool) -> Self {
        self.guess_from_filename = guess;
        self
    }

    pub fn max_authors(mut self, max: usize) -> Self {
        self.max_authors = max;
        self
    }

    pub fn build(self) -> AnyResult<RenameConfig> {
        let directory = self.directory.ok_or_else(|| anyhow::anyhow!("Directory is required"))?;

        if directory.as_os_str().is_empty() {
            anyhow::bail!("Directory is required");
        }
        if self.max_authors == 0 {
            anyhow::bail!("At least one author must be allowed in filenames");
        }

        Ok(RenameConfig {
            directory,
            include_hidden: self.include_hidden,
            guess_from_filename: self.guess_from_filename,
            max_authors: self.max_authors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, author: Option<&str>, title: Option<&str>) -> FileEntry {
        let path = PathBuf::from("/books").join(name);
        let kind = DocumentKind::from_path(&path).unwrap();
        FileEntry::new(path, kind, Some(Metadata::new(author, title)))
    }

    fn statuses(plan: &RenamePlan) -> Vec<(&str, Option<&str>, &PlanStatus)> {
        plan.entries
            .iter()
            .map(|e| (e.file.original_path.file_name().unwrap().to_str().unwrap(), e.proposed_name.as_deref(), &e.status))
            .collect()
    }

    #[test]
    fn test_collision_with_existing_name() {
        let files = vec![entry("A - T.pdf", Some("A"), Some("T")), entry("B - T.pdf", Some("A"), Some("T"))];
        let plan = plan_files(Path::new("/books"), ["A - T.pdf", "B - T.pdf"], files, 3);
        assert_eq!(
            statuses(&plan),
            vec![
                ("A - T.pdf", Some("A - T.pdf"), &PlanStatus::Unchanged),
                ("B - T.pdf", Some("A - T (2).pdf"), &PlanStatus::Ready),
            ]
        );
    }

    #[test]
    fn test_unrelated_file_is_never_targeted() {
        let files = vec![entry("scan1.pdf", Some("Jane Doe"), Some("Notes"))];
        let plan = plan_files(Path::new("/books"), ["scan1.pdf", "Jane Doe - Notes.pdf", "cover.jpg"], files, 3);
        assert_eq!(plan.entries[0].proposed_name.as_deref(), Some("Jane Doe - Notes (2).pdf"));
    }

    #[test]
    fn test_proposals_are_distinct_within_plan() {
        let files = vec![
            entry("1.epub", Some("X"), Some("Y")),
            entry("2.epub", Some("x"), Some("y")),
            entry("3.EPUB", Some("X"), Some("Y")),
        ];
        let plan = plan_files(Path::new("/books"), ["1.epub", "2.epub", "3.EPUB"], files, 3);
        let names: Vec<_> = plan.entries.iter().filter_map(|e| e.proposed_name.clone()).collect();
        assert_eq!(names, vec!["X - Y.epub", "x - y (2).epub", "X - Y (3).EPUB"]);
    }

    #[test]
    fn test_case_only_difference_is_unchanged() {
        let files = vec![entry("dune.txt", None, Some("Dune"))];
        let plan = plan_files(Path::new("/books"), ["dune.txt"], files, 3);
        assert_eq!(plan.entries[0].status, PlanStatus::Unchanged);
    }

    #[test]
    fn test_no_metadata_and_error() {
        let files = vec![entry("blank.txt", Some("  "), None)];
        let mut plan = plan_files(Path::new("/books"), ["blank.txt"], files, 3);
        assert_eq!(plan.entries[0].status, PlanStatus::NoMetadata);
        assert_eq!(plan.entries[0].proposed_name, None);
        assert_eq!(plan.toggle_approval(0), None);

        let failed = Planner::failed(entry("x.pdf", None, None), "permission denied");
        assert!(!failed.will_rename());
        assert_eq!(failed.status.to_string(), "Error: permission denied");
    }

    #[test]
    fn test_authors_normalized_and_limited() {
        let files = vec![entry("paper.pdf", Some("Doe, Jane; Roe, Rick; Poe, Ed; Low, Al"), Some("Survey"))];
        let plan = plan_files(Path::new("/books"), ["paper.pdf"], files, 2);
        assert_eq!(plan.entries[0].proposed_name.as_deref(), Some("Jane Doe, Rick Roe et al - Survey.pdf"));
    }

    #[test]
    fn test_toggle_approval() {
        let files = vec![entry("a.pdf", Some("A"), Some("B"))];
        let mut plan = plan_files(Path::new("/books"), ["a.pdf"], files, 3);
        assert_eq!(plan.ready_count(), 1);
        assert_eq!(plan.toggle_approval(0), Some(false));
        assert_eq!(plan.ready_count(), 0);
        assert_eq!(plan.toggle_approval(0), Some(true));
        assert_eq!(plan.toggle_approval(5), None);
    }

    #[test]
    fn test_set_proposed_name() {
        let files = vec![entry("scan.pdf", None, None), entry("b.pdf", Some("A"), Some("T"))];
        let mut plan = plan_files(Path::new("/books"), ["scan.pdf", "b.pdf", "cover.jpg", "Old Notes.pdf"], files, 3);
        assert_eq!(plan.entries[0].status, PlanStatus::NoMetadata);

        assert_eq!(plan.set_proposed_name(0, "  My: Notes  "), Ok("My Notes.pdf".to_string()));
        assert_eq!(plan.entries[0].status, PlanStatus::Ready);
        assert!(plan.entries[0].will_rename());

        assert_eq!(plan.set_proposed_name(0, "Lecture.PDF"), Ok("Lecture.pdf".to_string()));
        assert_eq!(plan.set_proposed_name(0, "con"), Ok("_con.pdf".to_string()));
        assert_eq!(plan.ready_count(), 2);
    }

    #[test]
    fn test_set_proposed_name_rejects_taken_and_empty() {
        let files = vec![entry("scan.pdf", None, None), entry("b.pdf", Some("A"), Some("T"))];
        let mut plan = plan_files(Path::new("/books"), ["scan.pdf", "b.pdf", "Old Notes.pdf"], files, 3);
        plan.set_proposed_name(0, "Draft").unwrap();

        assert_eq!(plan.set_proposed_name(0, "a - t"), Err(EditError::Taken("a - t.pdf".into())));
        assert_eq!(plan.set_proposed_name(0, "OLD NOTES.pdf"), Err(EditError::Taken("OLD NOTES.pdf".into())));
        assert_eq!(plan.set_proposed_name(0, "B"), Err(EditError::Taken("B.pdf".into())));
        assert_eq!(plan.set_proposed_name(1, "draft"), Err(EditError::Taken("draft.pdf".into())));
        assert_eq!(plan.set_proposed_name(0, " /// ... "), Err(EditError::Empty));
        assert_eq!(plan.set_proposed_name(7, "x"), Err(EditError::NoSuchEntry(7)));

        assert_eq!(plan.entries[0].proposed_name.as_deref(), Some("Draft.pdf"));
        assert_eq!(plan.entries[1].proposed_name.as_deref(), Some("A - T.pdf"));
    }

    #[test]
    fn test_set_proposed_name_own_name_is_unchanged() {
        let files = vec![entry("b.pdf", Some("A"), Some("T"))];
        let mut plan = plan_files(Path::new("/books"), ["b.pdf"], files, 3);
        plan.toggle_approval(0);

        assert_eq!(plan.set_proposed_name(0, "B"), Ok("B.pdf".to_string()));
        assert_eq!(plan.entries[0].status, PlanStatus::Unchanged);
        assert!(plan.entries[0].approved);
        assert_eq!(plan.ready_count(), 0);
    }

    #[test]
    fn test_set_proposed_name_limits_length() {
        let files = vec![entry("scan.epub", None, None)];
        let mut plan = plan_files(Path::new("/books"), ["scan.epub"], files, 3);
        let name = plan.set_proposed_name(0, &"書".repeat(150)).unwrap();
        assert!(name.len() <= crate::sanitize::MAX_BASE_NAME_BYTES + ".epub".len());
        assert!(name.ends_with(".epub"));
    }

    #[test]
    fn test_hidden_rows_are_not_editable() {
        let mut plan = RenamePlan {
            folder: PathBuf::from("/books"),
            entries: vec![Planner::hidden(entry(".draft.pdf", Some("A"), Some("B")))],
            existing_names: vec![".draft.pdf".into()],
        };
        assert_eq!(plan.entries[0].status.to_string(), "Hidden (skipped)");
        assert!(!plan.entries[0].will_rename());
        assert_eq!(plan.toggle_approval(0), None);
        assert_eq!(plan.set_proposed_name(0, "Visible"), Err(EditError::Hidden));
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .directory("/test/path")
            .guess_from_filename(true)
            .build()
            .unwrap();

        assert_eq!(config.directory, PathBuf::from("/test/path"));
        assert!(config.guess_from_filename);
        assert!(!config.include_hidden);
        assert_eq!(config.max_authors, DEFAULT_MAX_AUTHORS);

        assert!(ConfigBuilder::new().build().is_err());
        assert!(ConfigBuilder::new().directory("/x").max_authors(0).build().is_err());
    }

    #[test]
    fn test_cancel_flag_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        other.cancel();
        assert!(flag.is_cancelled());
        flag.reset();
        assert!(!other.is_cancelled());
    }
}
