//! State and wire contracts of the single-host monitoring console. Nothing
//! in here performs I/O; the console binary executes the requests these
//! types describe and feeds the results back in.

pub mod api;
pub mod editor;
pub mod file_manager;
pub mod files;
pub mod format;
pub mod modal;
pub mod telemetry;
pub mod view;

pub use api::{ApiError, ConfigError, Endpoints};
pub use editor::EditorBuffer;
pub use file_manager::{
    Effect, EditorSession, FileManager, ModalAction, Notice, NoticeLevel, Row,
};
pub use files::{FileEntry, FileReply, FileRequest, HttpMethod, WriteOrigin};
pub use modal::{ModalBody, ModalController};
pub use telemetry::{
    ConnectionStatus, LinkCommand, LinkEvent, LinkTiming, TelemetryLink, TelemetryPanel,
    TelemetrySnapshot, Transport,
};
pub use view::{Tab, ViewController};
