use crate::rename_engine::{ExecutionOutcome, ExecutionResult, PlanEntry, PlanStatus, Progress, RenamePlan};

/// One row of the preview list.
#[derive(Debug, Clone)]
pub struct FileItem {
    pub original_name: String,
    pub proposed_name: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub plan_status: PlanStatus,
    pub approved: bool,
    pub status: ProcessingStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Success,
    Error(String),
    Skipped,
}

impl FileItem {
    pub fn from_entry(entry: &PlanEntry) -> Self {
        Self {
            original_name: entry.file.file_name(),
            proposed_name: entry.proposed_name.clone(),
            author: entry.file.extracted_author.clone(),
            title: entry.file.extracted_title.clone(),
            plan_status: entry.status.clone(),
            approved: entry.approved,
            status: ProcessingStatus::Pending,
        }
    }

    pub fn will_rename(&self) -> bool {
        self.plan_status == PlanStatus::Ready && self.approved
    }

    pub fn apply_outcome(&mut self, outcome: &ExecutionOutcome) {
        self.status = match outcome {
            ExecutionOutcome::Renamed(_) => ProcessingStatus::Success,
            ExecutionOutcome::Skipped => ProcessingStatus::Skipped,
            ExecutionOutcome::Failed(reason) => ProcessingStatus::Error(reason.clone()),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigInputMode {
    Directory,
    Options,
    Confirm,
}

/// Which option line has focus on the configuration screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOption {
    IncludeHidden,
    GuessFromFilename,
    MaxAuthors,
}

impl ConfigOption {
    pub const ALL: [ConfigOption; 3] = [Self::IncludeHidden, Self::GuessFromFilename, Self::MaxAuthors];

    pub fn next(self) -> Self {
        match self {
            Self::IncludeHidden => Self::GuessFromFilename,
            Self::GuessFromFilename => Self::MaxAuthors,
            Self::MaxAuthors => Self::IncludeHidden,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::IncludeHidden => Self::MaxAuthors,
            Self::GuessFromFilename => Self::IncludeHidden,
            Self::MaxAuthors => Self::GuessFromFilename,
        }
    }
}

/// What the interface is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Planning,
    Reviewing,
    Executing,
    Finished,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Planning | Self::Executing)
    }
}

#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Messages from the background planning/renaming task to the UI loop.
#[derive(Debug)]
pub enum WorkerEvent {
    Progress(Progress),
    Planned(Result<RenamePlan, String>),
    Executed(Vec<ExecutionResult>),
}
