#![allow(dead_code)]

use std::sync::Arc;

use extrudekit::{AppConfig, AppEvent, EventBus, LoadRequest, Viewer};
use extrudekit_core::EventFilter;
use parking_lot::Mutex;

pub const SQUARES_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100">
    <rect x="10" y="10" width="80" height="80" fill="#e53935"/>
    <path d="M110 10 H190 V90 H110 Z M130 30 V70 H170 V30 Z" fill-rule="evenodd"/>
</svg>"##;

pub const EMPTY_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path d="M1 1"/></svg>"#;

/// Viewer plus every event it published
pub struct Harness {
    pub viewer: Viewer,
    pub events: Arc<Mutex<Vec<AppEvent>>>,
}

impl Harness {
    pub fn new() -> Self {
        let bus = Arc::new(EventBus::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        bus.subscribe(EventFilter::All, move |event| sink.lock().push(event));
        Self {
            viewer: Viewer::new(AppConfig::default(), bus),
            events,
        }
    }

    pub fn take_events(&self) -> Vec<AppEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                AppEvent::Error(err) => Some(err.message.clone()),
                _ => None,
            })
            .collect()
    }
}

pub fn svg_request(markup: &str) -> LoadRequest {
    LoadRequest::new("art.svg", markup.as_bytes().to_vec())
}

/// A binary glTF holding one triangle
pub fn triangle_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    for v in [[0.0f32, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 3.0, 1.0]] {
        for c in v {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let mut json = concat!(
        r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"#,
        r#""nodes":[{"mesh":0}],"#,
        r#""meshes":[{"primitives":[{"attributes":{"POSITION":0}}]}],"#,
        r#""accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[3,3,1]}],"#,
        r#""bufferViews":[{"buffer":0,"byteLength":36}],"#,
        r#""buffers":[{"byteLength":36}]}"#
    )
    .as_bytes()
    .to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}
