use pretty_assertions::assert_eq;
use smc_core::files::{AckResponse, ListResponse, ReadResponse};
use smc_core::{
    ApiError, Effect, Endpoints, FileEntry, FileManager, FileReply, FileRequest, LinkCommand,
    LinkEvent, LinkTiming, Tab, TelemetryLink, TelemetryPanel, ViewController,
};
use std::time::Duration;

fn entry(name: &str, is_directory: bool) -> FileEntry {
    FileEntry {
        name: name.to_string(),
        is_directory,
        size: 42,
        modified_time: 1_700_000_000_000,
        permissions: "rw-".to_string(),
        ..FileEntry::default()
    }
}

/// Stands in for the HTTP round trip: encode the body the server would send
/// and parse it back through the same path the console uses.
fn reply(request: &FileRequest, body: serde_json::Value) -> Result<FileReply, ApiError> {
    FileReply::from_body(request, &body.to_string())
}

#[test]
fn delete_flow_issues_delete_then_relists_root() {
    let endpoints = Endpoints::from_console_url("http://host:8080/?token=t", None)
        .expect("endpoints");
    let mut view = ViewController::new();
    let mut files = FileManager::new();

    let list = view.activate(Tab::Files, &mut files).expect("list on activation");
    let body = serde_json::to_value(ListResponse {
        success: true,
        current_path: "/".to_string(),
        files: vec![entry("notes.txt", false)],
        message: String::new(),
    })
    .expect("list body");
    files.apply(list.clone(), reply(&list, body));

    files.prompt_delete("notes.txt");
    let Some(Effect::Request(delete)) = files.confirm_modal() else {
        panic!("expected a delete request");
    };
    assert_eq!(
        endpoints.file_url(&delete).as_str(),
        "http://host:8080/api/files/delete?path=notes.txt&token=t"
    );

    let body = serde_json::to_value(AckResponse {
        success: true,
        message: "deleted".to_string(),
    })
    .expect("ack body");
    let follow_up = files.apply(delete.clone(), reply(&delete, body));
    assert_eq!(
        follow_up,
        Some(FileRequest::List {
            path: "/".to_string()
        })
    );
    assert_eq!(files.notice().map(|n| n.text.as_str()), Some("deleted"));
}

#[test]
fn overlapping_lists_resolve_to_last_applied() {
    let mut files = FileManager::new();
    let slow = files.list("/slow");
    let fast = files.list("/fast");

    let fast_body = serde_json::json!({"success": true, "currentPath": "/fast", "files": []});
    let slow_body = serde_json::json!({
        "success": true,
        "currentPath": "/slow",
        "files": [{"name": "x", "isDirectory": false}]
    });
    files.apply(fast.clone(), reply(&fast, fast_body));
    files.apply(slow.clone(), reply(&slow, slow_body));

    assert_eq!(files.current_path(), "/slow");
    assert_eq!(files.listing().map(|l| l.entries.len()), Some(1));
}

#[test]
fn second_open_replaces_unsaved_session() {
    let mut files = FileManager::new();
    for (name, content) in [("a.txt", "first"), ("b.txt", "second")] {
        let read = files.open(name, false);
        let body = serde_json::to_value(ReadResponse {
            success: true,
            file_name: name.to_string(),
            content: content.to_string(),
            ..ReadResponse::default()
        })
        .expect("read body");
        files.apply(read.clone(), reply(&read, body));
        if let Some(session) = files.editor_mut() {
            session.buffer.insert_char('*');
        }
    }
    let session = files.editor().expect("editor session");
    assert_eq!(session.file_name, "b.txt");
    assert_eq!(session.content(), "*second");
}

#[test]
fn server_rejection_reaches_the_notice_verbatim() {
    let mut files = FileManager::new();
    let create = FileRequest::Create {
        path: "logs".to_string(),
        is_directory: true,
    };
    let body = serde_json::json!({"success": false, "message": "already exists: logs"});
    assert_eq!(files.apply(create.clone(), reply(&create, body)), None);
    assert_eq!(
        files.notice().map(|n| n.text.as_str()),
        Some("create directory failed: already exists: logs")
    );
}

#[test]
fn closed_push_reconnects_then_falls_back_to_polling() {
    let mut link = TelemetryLink::new(LinkTiming {
        reconnect_delay: Duration::from_secs(1),
        poll_interval: Duration::from_secs(1),
    });
    assert_eq!(link.start(), LinkCommand::Connect);
    link.on_event(LinkEvent::PushOpened);
    link.on_event(LinkEvent::Frame(
        r#"{"cpuUsage":0.42,"memoryUsedBytes":512,"memoryTotalBytes":1024}"#.to_string(),
    ));

    assert_eq!(
        link.on_event(LinkEvent::PushClosed),
        LinkCommand::ReconnectAfter(Duration::from_secs(1))
    );
    assert_eq!(
        link.on_event(LinkEvent::PushUnavailable("connection refused".to_string())),
        LinkCommand::StartPolling(Duration::from_secs(1))
    );
    link.on_event(LinkEvent::PollFailed("timed out".to_string()));
    assert_eq!(link.status().label(), "offline");

    let panel = TelemetryPanel::from_snapshot(link.latest().expect("last snapshot kept"));
    assert_eq!(panel.cpu_text, "42.0%");
    assert_eq!(panel.memory_percent, 50.0);
}
