//! In-memory page used by unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Element, PageError, TextTrack, VideoPage};

#[derive(Default, Clone)]
struct Dom {
    elements: HashMap<String, Vec<Element>>,
    nested: HashMap<(String, String), Vec<Option<String>>>,
}

/// Changes applied to the DOM when a handle is activated
#[derive(Default, Clone)]
pub struct Reveal {
    elements: Vec<(String, Vec<Element>)>,
    nested: Vec<(String, String, Vec<Option<String>>)>,
}

impl Reveal {
    pub fn elements(mut self, selector: &str, elements: Vec<Element>) -> Self {
        self.elements.push((selector.to_string(), elements));
        self
    }

    pub fn nested(mut self, outer: &str, inner: &str, texts: Vec<Option<&str>>) -> Self {
        self.nested.push((
            outer.to_string(),
            inner.to_string(),
            texts.into_iter().map(|t| t.map(str::to_string)).collect(),
        ));
        self
    }
}

pub struct FakePage {
    location: String,
    dom: Mutex<Dom>,
    reveals: HashMap<String, Reveal>,
    tracks: Vec<TextTrack>,
    cues: HashMap<usize, Vec<String>>,
    responses: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakePage {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            dom: Mutex::new(Dom::default()),
            reveals: HashMap::new(),
            tracks: Vec::new(),
            cues: HashMap::new(),
            responses: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_elements(self, selector: &str, elements: Vec<Element>) -> Self {
        self.dom
            .lock()
            .unwrap()
            .elements
            .insert(selector.to_string(), elements);
        self
    }

    pub fn with_nested(self, outer: &str, inner: &str, texts: Vec<Option<&str>>) -> Self {
        self.dom.lock().unwrap().nested.insert(
            (outer.to_string(), inner.to_string()),
            texts.into_iter().map(|t| t.map(str::to_string)).collect(),
        );
        self
    }

    pub fn with_track(mut self, language: &str, label: &str, cues: &[&str]) -> Self {
        let index = self.tracks.len();
        self.tracks.push(TextTrack {
            index,
            language: language.to_string(),
            label: label.to_string(),
            source: None,
        });
        self.cues
            .insert(index, cues.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_response(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.to_string());
        self
    }

    pub fn on_activate(mut self, handle: &str, reveal: Reveal) -> Self {
        self.reveals.insert(handle.to_string(), reveal);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VideoPage for FakePage {
    fn location(&self) -> &str {
        &self.location
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>, PageError> {
        self.record(format!("query:{selector}"));
        Ok(self
            .dom
            .lock()
            .unwrap()
            .elements
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn query_within(&self, outer: &str, inner: &str) -> Result<Vec<Option<String>>, PageError> {
        self.record(format!("within:{outer} {inner}"));
        Ok(self
            .dom
            .lock()
            .unwrap()
            .nested
            .get(&(outer.to_string(), inner.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn activate(&self, element: &Element) -> Result<(), PageError> {
        self.record(format!("activate:{}", element.handle));
        if let Some(reveal) = self.reveals.get(&element.handle) {
            let mut dom = self.dom.lock().unwrap();
            for (selector, elements) in &reveal.elements {
                dom.elements.insert(selector.clone(), elements.clone());
            }
            for (outer, inner, texts) in &reveal.nested {
                dom.nested
                    .insert((outer.clone(), inner.clone()), texts.clone());
            }
        }
        Ok(())
    }

    async fn text_tracks(&self) -> Result<Vec<TextTrack>, PageError> {
        self.record("tracks".to_string());
        Ok(self.tracks.clone())
    }

    async fn show_track(&self, track: &TextTrack) -> Result<(), PageError> {
        self.record(format!("show:{}", track.label));
        Ok(())
    }

    async fn track_cues(&self, track: &TextTrack) -> Result<Vec<String>, PageError> {
        self.record(format!("cues:{}", track.label));
        Ok(self.cues.get(&track.index).cloned().unwrap_or_default())
    }

    async fn fetch_text(&self, url: &str) -> Result<String, PageError> {
        self.record(format!("fetch:{url}"));
        Ok(self.responses.get(url).cloned().unwrap_or_default())
    }
}
