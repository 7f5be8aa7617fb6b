//! Ordered create/update pipeline stages.
//!
//! Each field rule (seed on create, normalize on write, derive from another
//! field) is a named [`Stage`] with one signature: it reads the candidate
//! [`BoardDraft`] and the requesting [`Viewer`] and either rewrites its
//! field or fails. The service runs [`CREATE_STAGES`] or [`UPDATE_STAGES`]
//! in order before any account lookups or writes happen.

use validator::Validate;

use super::labels::{assign_label_ids, default_labels, max_label_id};
use super::membership::dedup_members;
use super::scope::Viewer;
use super::slug::generate_slug;
use super::{Board, BoardPatch, CreateBoard, Label, LabelInput, NewBoard, UpdateBoard, MAX_TITLE_LEN};
use crate::error::CoreError;
use crate::types::DbId;

/// Candidate values flowing through the pipeline. `None` means "not part of
/// this write".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardDraft {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Labels as supplied by the client, before id assignment.
    pub labels: Option<Vec<LabelInput>>,
    /// Labels after id assignment.
    pub resolved_labels: Option<Vec<Label>>,
    pub label_seq: i64,
    pub owner: Option<DbId>,
    pub members: Vec<DbId>,
}

impl BoardDraft {
    pub fn for_create(input: &CreateBoard) -> Self {
        Self {
            title: Some(input.title.clone()),
            description: input.description.clone(),
            labels: input.labels.clone(),
            members: input.members.clone(),
            ..Default::default()
        }
    }

    pub fn for_update(board: &Board, input: &UpdateBoard) -> Self {
        Self {
            title: input.title.clone(),
            description: input.description.clone(),
            labels: input.labels.clone(),
            label_seq: board.label_seq.max(max_label_id(&board.labels)),
            owner: Some(board.owner),
            members: board.members.clone(),
            ..Default::default()
        }
    }
}

pub type StageFn = fn(&mut BoardDraft, &Viewer) -> Result<(), CoreError>;

/// A named pipeline stage.
#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub run: StageFn,
}

pub const CREATE_STAGES: &[Stage] = &[
    Stage { name: "seed_owner", run: seed_owner },
    Stage { name: "seed_members", run: seed_members },
    Stage { name: "normalize_title", run: normalize_title },
    Stage { name: "derive_slug", run: derive_slug },
    Stage { name: "normalize_description", run: normalize_description },
    Stage { name: "seed_labels", run: seed_labels },
    Stage { name: "assign_label_ids", run: assign_labels },
];

pub const UPDATE_STAGES: &[Stage] = &[
    Stage { name: "normalize_title", run: normalize_title },
    Stage { name: "derive_slug", run: derive_slug },
    Stage { name: "normalize_description", run: normalize_description },
    Stage { name: "assign_label_ids", run: assign_labels },
];

pub fn run_stages(stages: &[Stage], draft: &mut BoardDraft, viewer: &Viewer) -> Result<(), CoreError> {
    for stage in stages {
        (stage.run)(draft, viewer)?;
    }
    Ok(())
}

/// The creator becomes the owner.
fn seed_owner(draft: &mut BoardDraft, viewer: &Viewer) -> Result<(), CoreError> {
    let account_id = viewer
        .account_id()
        .ok_or_else(|| CoreError::Unauthorized("Authentication required".into()))?;
    draft.owner = Some(account_id);
    Ok(())
}

/// The creator is always the first member.
fn seed_members(draft: &mut BoardDraft, viewer: &Viewer) -> Result<(), CoreError> {
    let mut members: Vec<DbId> = viewer.account_id().into_iter().collect();
    members.extend_from_slice(&draft.members);
    draft.members = dedup_members(&members);
    Ok(())
}

fn normalize_title(draft: &mut BoardDraft, _viewer: &Viewer) -> Result<(), CoreError> {
    if let Some(title) = &draft.title {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        if trimmed.chars().count() as u64 > MAX_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        draft.title = Some(trimmed.to_string());
    }
    Ok(())
}

fn derive_slug(draft: &mut BoardDraft, _viewer: &Viewer) -> Result<(), CoreError> {
    if let Some(title) = &draft.title {
        draft.slug = Some(generate_slug(title));
    }
    Ok(())
}

fn normalize_description(draft: &mut BoardDraft, _viewer: &Viewer) -> Result<(), CoreError> {
    if let Some(description) = &draft.description {
        draft.description = Some(description.trim().to_string());
    }
    Ok(())
}

fn seed_labels(draft: &mut BoardDraft, _viewer: &Viewer) -> Result<(), CoreError> {
    if draft.labels.is_none() {
        draft.labels = Some(default_labels().into_iter().map(LabelInput::from).collect());
    }
    Ok(())
}

fn assign_labels(draft: &mut BoardDraft, _viewer: &Viewer) -> Result<(), CoreError> {
    if let Some(inputs) = draft.labels.take() {
        for input in &inputs {
            if input.name.trim().is_empty() || input.color.trim().is_empty() {
                return Err(CoreError::Validation(
                    "labels require a name and a color".into(),
                ));
            }
        }
        let (labels, seq) = assign_label_ids(inputs, draft.label_seq);
        draft.resolved_labels = Some(labels);
        draft.label_seq = seq;
    }
    Ok(())
}

fn validate_input(input: &impl Validate) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

/// Run the create pipeline and build the row to insert.
pub fn prepare_create(input: CreateBoard, viewer: &Viewer) -> Result<NewBoard, CoreError> {
    validate_input(&input)?;
    let mut draft = BoardDraft::for_create(&input);
    run_stages(CREATE_STAGES, &mut draft, viewer)?;

    let owner = draft
        .owner
        .ok_or_else(|| CoreError::Internal("create pipeline did not seed an owner".into()))?;
    Ok(NewBoard {
        owner,
        title: draft.title.unwrap_or_default(),
        slug: draft.slug.unwrap_or_default(),
        description: draft.description,
        position: input.position.unwrap_or(0),
        public: input.public.unwrap_or(false),
        labels: draft.resolved_labels.unwrap_or_default(),
        label_seq: draft.label_seq,
        members: draft.members,
        options: input.options.unwrap_or_else(|| serde_json::json!({})),
    })
}

/// Run the update pipeline against `board` and build the patch.
pub fn prepare_update(
    board: &Board,
    input: UpdateBoard,
    viewer: &Viewer,
) -> Result<BoardPatch, CoreError> {
    validate_input(&input)?;
    let mut draft = BoardDraft::for_update(board, &input);
    run_stages(UPDATE_STAGES, &mut draft, viewer)?;

    let label_seq = draft.resolved_labels.as_ref().map(|_| draft.label_seq);
    Ok(BoardPatch {
        title: draft.title,
        slug: draft.slug,
        description: draft.description.map(Some),
        position: input.position,
        public: input.public,
        labels: draft.resolved_labels,
        label_seq,
        options: input.options,
        ..Default::default()
    })
}
