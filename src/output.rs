//! Console output for the `nvb` binary
//!
//! Human-readable text by default. With `--json`, every event is written to
//! stdout as one NDJSON line carrying an `"event"` tag and a millisecond
//! `"timestamp"`:
//!
//! ```json
//! {"event":"file_opened","file":"/game/Assets/Player.cs","line":12,"column":0,"command":"nvr ...","focused":true,"timestamp":1704700001000}
//! {"event":"installations","installations":[{"name":"Neovim","path":"/usr/bin/nvr"}],"timestamp":1704700001000}
//! ```

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use nvb_app::{GenerationFlag, GenerationFlags, HostEvent, Notifier};
use nvb_core::Installation;

/// CLI-only events (the host-facing ones are [`HostEvent`])
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CliEvent {
    Installations {
        installations: Vec<Installation>,
    },

    InstallationFound {
        path: String,
        installation: Option<Installation>,
    },

    Flags {
        enabled: Vec<String>,
    },

    FlagToggled {
        flag: String,
        enabled: bool,
    },

    Status {
        remote_tool: String,
        available: bool,
        servers: Vec<String>,
    },

    ConfigInitialized {
        path: String,
        created: bool,
    },

    Watching {
        paths: Vec<String>,
    },

    Error {
        message: String,
    },
}

#[derive(Serialize)]
struct Envelope<'a, E: Serialize> {
    #[serde(flatten)]
    event: &'a E,
    timestamp: i64,
}

/// Render `event` as one NDJSON line.
pub fn to_ndjson<E: Serialize>(event: &E) -> serde_json::Result<String> {
    serde_json::to_string(&Envelope {
        event,
        timestamp: Utc::now().timestamp_millis(),
    })
}

fn emit_json<E: Serialize>(event: &E) {
    let json = match to_ndjson(event) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize event: {}", e);
            return;
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", json) {
        error!("Failed to write event to stdout: {}", e);
        return;
    }
    if let Err(e) = stdout.flush() {
        error!("Failed to flush stdout: {}", e);
    }
}

/// Writes events to the console in the selected format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    json: bool,
}

impl ConsoleNotifier {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn emit(&self, event: &CliEvent) {
        if self.json {
            emit_json(event);
            return;
        }
        match event {
            CliEvent::Error { message } => eprintln!("Error: {}", message),
            other => println!("{}", render_cli(other)),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: &HostEvent) {
        if self.json {
            emit_json(event);
        } else if event.is_failure() {
            eprintln!("{}", render_host(event));
        } else {
            println!("{}", render_host(event));
        }
    }
}

/// Human-readable form of a host event.
pub fn render_host(event: &HostEvent) -> String {
    match event {
        HostEvent::FileOpened {
            file,
            line,
            column,
            focused,
            ..
        } => {
            let mut text = format!("Opened {} at {}:{}", file, line, column);
            if !focused {
                text.push_str(" (editor not focused)");
            }
            text
        }
        HostEvent::OpenFailed { file, error } => format!("Could not open {}: {}", file, error),
        HostEvent::ProjectSynced { changed, imported } => {
            if *changed == 0 && *imported == 0 {
                "Project sync requested (no changes)".to_string()
            } else {
                format!(
                    "Project synced ({} changed, {} imported)",
                    changed, imported
                )
            }
        }
        HostEvent::ProjectRegenerated => "Project files regenerated".to_string(),
        HostEvent::SyncFailed { error } => format!("Sync failed: {}", error),
    }
}

/// Human-readable form of a CLI event.
pub fn render_cli(event: &CliEvent) -> String {
    match event {
        CliEvent::Installations { installations } => installations
            .iter()
            .map(|i| format!("{}\t{}", i.name, i.path))
            .collect::<Vec<_>>()
            .join("\n"),
        CliEvent::InstallationFound {
            path,
            installation: Some(installation),
        } => format!("{}\t{}", installation.name, path),
        CliEvent::InstallationFound {
            path,
            installation: None,
        } => format!("No installation registered at {}", path),
        CliEvent::Flags { enabled } => render_flags(enabled),
        CliEvent::FlagToggled { flag, enabled } => format!(
            "{} {}",
            flag,
            if *enabled { "enabled" } else { "disabled" }
        ),
        CliEvent::Status {
            remote_tool,
            available,
            servers,
        } => {
            let mut lines = vec![format!(
                "{}: {}",
                remote_tool,
                if *available { "found" } else { "not found" }
            )];
            if servers.is_empty() {
                lines.push("No running Neovim servers".to_string());
            } else {
                lines.extend(servers.iter().map(|s| format!("  {}", s)));
            }
            lines.join("\n")
        }
        CliEvent::ConfigInitialized { path, created } => {
            if *created {
                format!("Created {}", path)
            } else {
                format!("{} already exists", path)
            }
        }
        CliEvent::Watching { paths } => format!("Watching {} (Ctrl+C to stop)", paths.join(", ")),
        CliEvent::Error { message } => format!("Error: {}", message),
    }
}

fn render_flags(enabled: &[String]) -> String {
    GenerationFlag::ALL
        .iter()
        .map(|flag| {
            let mark = if enabled.iter().any(|e| e == flag.key()) {
                "x"
            } else {
                " "
            };
            format!("[{}] {:<18} {}", mark, flag.key(), flag.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keys of the enabled flags, for [`CliEvent::Flags`].
pub fn enabled_keys(flags: &GenerationFlags) -> Vec<String> {
    flags.iter().map(|f| f.key().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nvb_core::CursorPosition;

    #[test]
    fn test_ndjson_has_tag_and_timestamp() {
        let event = HostEvent::file_opened(
            "/tmp/foo.cs",
            CursorPosition { line: 10, column: 3 },
            "nvr -c \"call cursor(10, 3)\" /tmp/foo.cs",
            true,
        );
        let line = to_ndjson(&event).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "file_opened");
        assert_eq!(value["line"], 10);
        assert_eq!(value["column"], 3);
        assert!(value["timestamp"].as_i64().unwrap() > 0);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_ndjson_unit_variant() {
        let line = to_ndjson(&HostEvent::ProjectRegenerated).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "project_regenerated");
    }

    #[test]
    fn test_render_open_outcomes() {
        let opened = HostEvent::file_opened("/a.cs", CursorPosition::default(), "nvr", false);
        assert_eq!(render_host(&opened), "Opened /a.cs at 1:0 (editor not focused)");

        let failed = HostEvent::OpenFailed {
            file: "/a.cs".to_string(),
            error: "Failed to start nvr: executable not found".to_string(),
        };
        assert!(render_host(&failed).starts_with("Could not open /a.cs"));
    }

    #[test]
    fn test_render_flags_marks_enabled() {
        let text = render_cli(&CliEvent::Flags {
            enabled: enabled_keys(&GenerationFlags::default()),
        });
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), GenerationFlag::ALL.len());
        assert!(lines[0].starts_with("[x] embedded"));
        assert!(lines[2].starts_with("[ ] registry"));
    }

    #[test]
    fn test_render_missing_installation() {
        let text = render_cli(&CliEvent::InstallationFound {
            path: "/usr/bin/vim".to_string(),
            installation: None,
        });
        assert_eq!(text, "No installation registered at /usr/bin/vim");
    }
}
