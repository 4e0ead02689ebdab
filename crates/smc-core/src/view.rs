use crate::file_manager::FileManager;
use crate::files::FileRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Monitor,
    Files,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Monitor, Tab::Files];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Monitor => "Monitor",
            Tab::Files => "Files",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Monitor => Tab::Files,
            Tab::Files => Tab::Monitor,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Monitor => 0,
            Tab::Files => 1,
        }
    }
}

/// Exactly one tab is active at a time.
#[derive(Debug, Clone, Default)]
pub struct ViewController {
    active: Tab,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    /// Activating the files tab always re-lists the current directory, even
    /// when it was already active.
    pub fn activate(&mut self, tab: Tab, files: &mut FileManager) -> Option<FileRequest> {
        self.active = tab;
        match tab {
            Tab::Files => Some(files.refresh()),
            Tab::Monitor => None,
        }
    }

    pub fn cycle(&mut self, files: &mut FileManager) -> Option<FileRequest> {
        self.activate(self.active.next(), files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_monitor() {
        assert_eq!(ViewController::new().active(), Tab::Monitor);
    }

    #[test]
    fn files_tab_refreshes_on_every_activation() {
        let mut view = ViewController::new();
        let mut files = FileManager::new();
        let expected = Some(FileRequest::List {
            path: "/".to_string(),
        });

        assert_eq!(view.activate(Tab::Files, &mut files), expected);
        assert_eq!(view.activate(Tab::Files, &mut files), expected);
        assert_eq!(view.activate(Tab::Monitor, &mut files), None);
        assert_eq!(view.active(), Tab::Monitor);
    }

    #[test]
    fn cycle_alternates_tabs() {
        let mut view = ViewController::new();
        let mut files = FileManager::new();
        assert!(view.cycle(&mut files).is_some());
        assert_eq!(view.active(), Tab::Files);
        assert!(view.cycle(&mut files).is_none());
        assert_eq!(view.active(), Tab::Monitor);
    }
}
