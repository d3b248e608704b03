use uuid::Uuid;

use crate::engine::settings::Settings;
use crate::worker::messages::WorkerStatus;

/// Where this content script is running.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub url: String,
    pub domain: String,
    pub main_frame: bool,
}

impl FrameInfo {
    pub fn new(url: &str, main_frame: bool) -> Self {
        FrameInfo {
            url: url.to_string(),
            domain: domain_of(url),
            main_frame,
        }
    }
}

/// Host part of a URL: scheme and userinfo stripped, port and path cut.
/// The engine only ever compares hosts it was handed, so this stays a
/// small local helper rather than a full URL parser.
pub fn domain_of(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, r)| r);
    let rest = rest.rsplit_once('@').map_or(rest, |(_, r)| r);
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(rest);
    let host = host.split(':').next().unwrap_or(host);
    host.to_ascii_lowercase()
}

/// Per-instance context, constructed once by the lifecycle controller and
/// passed by reference to every component. Replaces the ambient
/// current-context singleton style with explicit injection.
#[derive(Debug, Clone)]
pub struct ScriptContext {
    pub settings: Settings,
    pub frame: FrameInfo,
    /// Fresh per injection; competing content-script instances compare
    /// these to decide who yields.
    pub instance_id: String,
    pub worker_status: WorkerStatus,
    pub logged_in: bool,
}

impl ScriptContext {
    pub fn new(settings: Settings, frame: FrameInfo) -> Self {
        ScriptContext {
            settings,
            frame,
            instance_id: Uuid::new_v4().to_string(),
            worker_status: WorkerStatus::Ready,
            logged_in: false,
        }
    }
}
