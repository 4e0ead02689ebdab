//! Navigation and mutation state of the remote file browser.
//!
//! Every operation returns the round trip to perform as a [`FileRequest`] (or
//! an [`Effect`] when local I/O comes first); the caller executes it and feeds
//! the typed result back through [`FileManager::apply`]. Requests are neither
//! queued nor fenced: whichever result is applied last wins.

use crate::api::ApiError;
use crate::editor::EditorBuffer;
use crate::files::{
    base_name, child_path, parent_path, DirectoryListing, FileEntry, FileReply, FileRequest,
    WriteOrigin, ROOT_PATH,
};
use crate::modal::{ModalBody, ModalController};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// The one file open for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    pub path: String,
    pub file_name: String,
    pub buffer: EditorBuffer,
}

impl EditorSession {
    pub fn content(&self) -> String {
        self.buffer.text()
    }
}

/// What confirming the open dialog does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    Create { is_directory: bool },
    Rename { old_name: String },
    Delete { name: String },
    Upload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Request(FileRequest),
    /// Read a local file as text, then hand it to [`FileManager::upload`].
    ReadLocalFile(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    Parent,
    Entry(&'a FileEntry),
}

#[derive(Debug, Clone)]
pub struct FileManager {
    current_path: String,
    listing: Option<DirectoryListing>,
    pending_lists: usize,
    list_error: Option<String>,
    selected: usize,
    editor: Option<EditorSession>,
    modal: ModalController<ModalAction>,
    notice: Option<Notice>,
}

impl Default for FileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FileManager {
    pub fn new() -> Self {
        Self {
            current_path: ROOT_PATH.to_string(),
            listing: None,
            pending_lists: 0,
            list_error: None,
            selected: 0,
            editor: None,
            modal: ModalController::new(),
            notice: None,
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn listing(&self) -> Option<&DirectoryListing> {
        self.listing.as_ref()
    }

    /// True while any list request is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending_lists > 0
    }

    pub fn list_error(&self) -> Option<&str> {
        self.list_error.as_deref()
    }

    pub fn editor(&self) -> Option<&EditorSession> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorSession> {
        self.editor.as_mut()
    }

    pub fn modal(&self) -> &ModalController<ModalAction> {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ModalController<ModalAction> {
        &mut self.modal
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Visible rows: ".." first unless the root was requested.
    pub fn rows(&self) -> Vec<Row<'_>> {
        let Some(listing) = &self.listing else {
            return Vec::new();
        };
        let mut rows = Vec::with_capacity(listing.entries.len() + 1);
        if !listing.is_root() {
            rows.push(Row::Parent);
        }
        rows.extend(listing.entries.iter().map(Row::Entry));
        rows
    }

    pub fn move_selection(&mut self, delta: isize) {
        let count = self.rows().len();
        if count == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, count as isize - 1) as usize;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn selected_row(&self) -> Option<Row<'_>> {
        self.rows().get(self.selected).copied()
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        match self.selected_row()? {
            Row::Entry(entry) => Some(entry),
            Row::Parent => None,
        }
    }

    pub fn list(&mut self, path: &str) -> FileRequest {
        self.pending_lists += 1;
        FileRequest::List {
            path: path.to_string(),
        }
    }

    pub fn refresh(&mut self) -> FileRequest {
        let path = self.current_path.clone();
        self.list(&path)
    }

    pub fn navigate_to_parent(&mut self) -> FileRequest {
        let parent = parent_path(&self.current_path);
        self.list(&parent)
    }

    /// Directories are listed, files are read into a new editor session.
    pub fn open(&mut self, name: &str, is_directory: bool) -> FileRequest {
        let path = child_path(&self.current_path, name);
        if is_directory {
            self.list(&path)
        } else {
            FileRequest::Read { path }
        }
    }

    pub fn open_selected(&mut self) -> Option<FileRequest> {
        let target = match self.selected_row()? {
            Row::Parent => None,
            Row::Entry(entry) => Some((entry.name.clone(), entry.is_directory)),
        };
        Some(match target {
            None => self.navigate_to_parent(),
            Some((name, is_directory)) => self.open(&name, is_directory),
        })
    }

    pub fn save(&mut self) -> Option<FileRequest> {
        let Some(session) = &self.editor else {
            self.notice = Some(Notice::error("no file open"));
            return None;
        };
        Some(FileRequest::Write {
            path: session.path.clone(),
            content: session.content(),
            origin: WriteOrigin::Save,
        })
    }

    /// Drops the session unconditionally, unsaved edits included.
    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    pub fn prompt_create(&mut self, is_directory: bool) {
        let kind = if is_directory { "directory" } else { "file" };
        self.modal.show(
            format!("New {kind}"),
            ModalBody::Prompt {
                label: format!("{kind} name"),
                input: String::new(),
            },
            ModalAction::Create { is_directory },
        );
    }

    pub fn prompt_rename(&mut self, old_name: &str) {
        self.modal.show(
            "Rename",
            ModalBody::Prompt {
                label: "new name".to_string(),
                input: old_name.to_string(),
            },
            ModalAction::Rename {
                old_name: old_name.to_string(),
            },
        );
    }

    pub fn prompt_delete(&mut self, name: &str) {
        self.modal.show(
            "Delete",
            ModalBody::Question(format!("Delete \"{name}\"?")),
            ModalAction::Delete {
                name: name.to_string(),
            },
        );
    }

    pub fn prompt_upload(&mut self) {
        self.modal.show(
            "Upload",
            ModalBody::Prompt {
                label: "local file".to_string(),
                input: String::new(),
            },
            ModalAction::Upload,
        );
    }

    /// Runs the dialog's binding. Empty names issue nothing.
    pub fn confirm_modal(&mut self) -> Option<Effect> {
        let confirmed = self.modal.confirm()?;
        let input = confirmed.input.unwrap_or_default();
        match confirmed.action {
            ModalAction::Create { is_directory } => {
                if input.is_empty() {
                    self.notice = Some(Notice::error("name required"));
                    return None;
                }
                Some(Effect::Request(FileRequest::Create {
                    path: child_path(&self.current_path, &input),
                    is_directory,
                }))
            }
            ModalAction::Rename { old_name } => {
                if input.is_empty() {
                    self.notice = Some(Notice::error("name required"));
                    return None;
                }
                Some(Effect::Request(FileRequest::Rename {
                    path: child_path(&self.current_path, &old_name),
                    new_name: input,
                }))
            }
            ModalAction::Delete { name } => Some(Effect::Request(FileRequest::Delete {
                path: child_path(&self.current_path, &name),
            })),
            ModalAction::Upload => {
                if input.is_empty() {
                    self.notice = Some(Notice::error("local file required"));
                    return None;
                }
                Some(Effect::ReadLocalFile(PathBuf::from(input)))
            }
        }
    }

    pub fn cancel_modal(&mut self) {
        self.modal.cancel();
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    /// Writes a local file's text under the current directory, keeping its
    /// file name.
    pub fn upload(&mut self, local_path: &Path, content: String) -> Option<FileRequest> {
        let Some(name) = local_path.file_name().and_then(|name| name.to_str()) else {
            self.notice = Some(Notice::error(format!(
                "upload failed: {} has no file name",
                local_path.display()
            )));
            return None;
        };
        Some(FileRequest::Write {
            path: child_path(&self.current_path, name),
            content,
            origin: WriteOrigin::Upload,
        })
    }

    pub fn local_read_failed(&mut self, local_path: &Path, reason: &str) {
        self.notice = Some(Notice::error(format!(
            "upload failed: cannot read {}: {reason}",
            local_path.display()
        )));
    }

    /// Reducer step for one completed round trip. Returns the follow-up
    /// listing refresh a successful mutation asks for.
    pub fn apply(
        &mut self,
        request: FileRequest,
        result: Result<FileReply, ApiError>,
    ) -> Option<FileRequest> {
        let label = request.label();
        if matches!(request, FileRequest::List { .. }) {
            self.pending_lists = self.pending_lists.saturating_sub(1);
        }
        match (request, result) {
            (FileRequest::List { path }, Ok(FileReply::Listing(response))) => {
                self.list_error = None;
                self.current_path = if response.current_path.is_empty() {
                    path.clone()
                } else {
                    response.current_path
                };
                let moved = self
                    .listing
                    .as_ref()
                    .map_or(true, |previous| previous.current_path != self.current_path);
                self.listing = Some(DirectoryListing {
                    current_path: self.current_path.clone(),
                    requested_path: path,
                    entries: response.files,
                });
                if moved {
                    self.selected = 0;
                } else {
                    self.clamp_selection();
                }
                None
            }
            (FileRequest::List { .. }, Err(err)) => {
                self.list_error = Some(err.to_string());
                None
            }
            (FileRequest::Read { path }, Ok(FileReply::Content(response))) => {
                let file_name = if response.file_name.is_empty() {
                    base_name(&path).to_string()
                } else {
                    response.file_name
                };
                self.notice = Some(Notice::info(format!("editing {file_name}")));
                self.editor = Some(EditorSession {
                    path,
                    file_name,
                    buffer: EditorBuffer::new(&response.content),
                });
                None
            }
            (
                FileRequest::Write {
                    path,
                    origin: WriteOrigin::Save,
                    ..
                },
                Ok(_),
            ) => {
                if let Some(session) = self.editor.as_mut().filter(|s| s.path == path) {
                    session.buffer.mark_saved();
                }
                self.notice = Some(Notice::success(format!("saved {}", base_name(&path))));
                None
            }
            (FileRequest::Write { path, .. }, Ok(_)) => {
                self.notice = Some(Notice::success(format!("uploaded {}", base_name(&path))));
                Some(self.refresh())
            }
            (FileRequest::List { .. } | FileRequest::Read { .. }, Ok(reply)) => {
                self.notice = Some(Notice::error(format!(
                    "{label} failed: unexpected reply {reply:?}"
                )));
                None
            }
            (_, Ok(reply)) => {
                let message = reply.message().trim();
                self.notice = Some(Notice::success(if message.is_empty() {
                    format!("{label} done")
                } else {
                    message.to_string()
                }));
                Some(self.refresh())
            }
            (_, Err(err)) => {
                self.notice = Some(Notice::error(format!("{label} failed: {err}")));
                None
            }
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.rows().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }
}
