use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use smc_core::{
    ApiError, ConnectionStatus, Effect, FileReply, FileRequest, FileManager, LinkCommand,
    LinkEvent, LinkTiming, ModalBody, Tab, TelemetryLink, ViewController,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Results flowing back into the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    Link(LinkEvent),
    File {
        request: FileRequest,
        result: Result<FileReply, ApiError>,
    },
    LocalFile {
        path: PathBuf,
        result: Result<String, String>,
    },
}

/// Work the UI loop hands to the transports.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Link(LinkCommand),
    File(FileRequest),
    ReadLocal(PathBuf),
}

pub struct App {
    pub view: ViewController,
    pub link: TelemetryLink,
    pub files: FileManager,
    pub help_open: bool,
    pub backend_label: String,
    quit: bool,
}

impl App {
    pub fn new(timing: LinkTiming, backend_label: String) -> Self {
        Self {
            view: ViewController::new(),
            link: TelemetryLink::new(timing),
            files: FileManager::new(),
            help_open: false,
            backend_label,
            quit: false,
        }
    }

    pub fn start(&self) -> Vec<Action> {
        vec![Action::Link(self.link.start())]
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn apply_event(&mut self, event: AppEvent) -> Vec<Action> {
        match event {
            AppEvent::Link(event) => {
                let before = self.link.status();
                let dropped = self.link.dropped_frames();
                let command = self.link.on_event(event);
                let after = self.link.status();
                if before != after {
                    info!("link_status: {} -> {}", before.label(), after.label());
                }
                if self.link.dropped_frames() > dropped {
                    debug!("push_frame_dropped: {}", self.link.dropped_frames());
                }
                match command {
                    LinkCommand::None => Vec::new(),
                    command => vec![Action::Link(command)],
                }
            }
            AppEvent::File { request, result } => {
                if let Err(err) = &result {
                    warn!("file_request_failed: {} {}: {err}", request.label(), request.path());
                }
                self.files
                    .apply(request, result)
                    .map(Action::File)
                    .into_iter()
                    .collect()
            }
            AppEvent::LocalFile { path, result } => match result {
                Ok(content) => self
                    .files
                    .upload(&path, content)
                    .map(Action::File)
                    .into_iter()
                    .collect(),
                Err(reason) => {
                    warn!("local_read_failed: {}: {reason}", path.display());
                    self.files.local_read_failed(&path, &reason);
                    Vec::new()
                }
            },
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.link.status()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.quit = true;
            return Vec::new();
        }
        if self.help_open {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
                self.help_open = false;
            }
            return Vec::new();
        }
        if self.files.modal().is_visible() {
            return self.handle_modal_key(key);
        }
        if self.view.active() == Tab::Files && self.files.editor().is_some() {
            return self.handle_editor_key(key);
        }
        match key.code {
            KeyCode::Char('q') => {
                self.quit = true;
                Vec::new()
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.help_open = true;
                Vec::new()
            }
            KeyCode::Char('1') => self.activate(Tab::Monitor),
            KeyCode::Char('2') => self.activate(Tab::Files),
            KeyCode::Tab => self
                .view
                .cycle(&mut self.files)
                .map(Action::File)
                .into_iter()
                .collect(),
            _ if self.view.active() == Tab::Files => self.handle_files_key(key),
            _ => Vec::new(),
        }
    }

    fn activate(&mut self, tab: Tab) -> Vec<Action> {
        self.view
            .activate(tab, &mut self.files)
            .map(Action::File)
            .into_iter()
            .collect()
    }

    fn handle_files_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let request = match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.files.move_selection(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.files.move_selection(-1);
                None
            }
            KeyCode::Char('g') => {
                self.files.select_first();
                None
            }
            KeyCode::Enter => self.files.open_selected(),
            KeyCode::Backspace | KeyCode::Char('h') => Some(self.files.navigate_to_parent()),
            KeyCode::Char('r') => Some(self.files.refresh()),
            KeyCode::Char('n') => {
                self.files.prompt_create(false);
                None
            }
            KeyCode::Char('d') => {
                self.files.prompt_create(true);
                None
            }
            KeyCode::Char('m') => {
                if let Some(name) = self.files.selected_entry().map(|entry| entry.name.clone()) {
                    self.files.prompt_rename(&name);
                }
                None
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(name) = self.files.selected_entry().map(|entry| entry.name.clone()) {
                    self.files.prompt_delete(&name);
                }
                None
            }
            KeyCode::Char('u') => {
                self.files.prompt_upload();
                None
            }
            KeyCode::Esc => {
                self.files.clear_notice();
                None
            }
            _ => None,
        };
        request.map(Action::File).into_iter().collect()
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('w') {
            self.files.close_modal();
            return Vec::new();
        }
        let is_question = matches!(
            self.files.modal().current().map(|request| &request.body),
            Some(ModalBody::Question(_))
        );
        match key.code {
            KeyCode::Esc => {
                self.files.cancel_modal();
                Vec::new()
            }
            KeyCode::Enter => self.confirm_modal(),
            KeyCode::Char('y') if is_question => self.confirm_modal(),
            KeyCode::Char('n') if is_question => {
                self.files.cancel_modal();
                Vec::new()
            }
            KeyCode::Backspace => {
                if let Some(input) = self.files.modal_mut().input_mut() {
                    input.pop();
                }
                Vec::new()
            }
            KeyCode::Char(ch) if !ctrl => {
                if let Some(input) = self.files.modal_mut().input_mut() {
                    input.push(ch);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn confirm_modal(&mut self) -> Vec<Action> {
        match self.files.confirm_modal() {
            Some(Effect::Request(request)) => vec![Action::File(request)],
            Some(Effect::ReadLocalFile(path)) => vec![Action::ReadLocal(path)],
            None => Vec::new(),
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('s') {
            return self.files.save().map(Action::File).into_iter().collect();
        }
        if key.code == KeyCode::Esc {
            self.files.close_editor();
            return Vec::new();
        }
        let Some(session) = self.files.editor_mut() else {
            return Vec::new();
        };
        let buffer = &mut session.buffer;
        match key.code {
            KeyCode::Char(ch) if !ctrl => buffer.insert_char(ch),
            KeyCode::Tab => buffer.insert_char('\t'),
            KeyCode::Enter => buffer.insert_newline(),
            KeyCode::Backspace => buffer.backspace(),
            KeyCode::Delete => buffer.delete(),
            KeyCode::Left => buffer.move_left(),
            KeyCode::Right => buffer.move_right(),
            KeyCode::Up => buffer.move_up(),
            KeyCode::Down => buffer.move_down(),
            KeyCode::Home => buffer.move_home(),
            KeyCode::End => buffer.move_end(),
            _ => {}
        }
        Vec::new()
    }
}
