//! The per-page agent: enablement, scanning and the event loop.

use std::future;

use cinema::{InputEvent, OverlayStyles, RelocationController};
use dom::{DOMUpdate, Document};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::config::AgentConfig;
use crate::messages::{AgentEvent, HostMessage};
use crate::scanner::{ScanResult, Scanner};

pub struct PageAgent {
    doc: Document,
    config: AgentConfig,
    scanner: Scanner,
    styles: OverlayStyles,
    controller: RelocationController,
    enabled: bool,
    current: Option<ScanResult>,
    scans: usize,
}

impl PageAgent {
    /// A disabled agent for `doc`. Call [`PageAgent::set_enabled`] to start.
    pub fn new(doc: Document, config: AgentConfig) -> Self {
        let scanner = Scanner::new(&config.selectors);
        let controller = RelocationController::new(config.trigger_label.clone());
        Self {
            doc,
            config,
            scanner,
            styles: OverlayStyles::new(),
            controller,
            enabled: false,
            current: None,
            scans: 0,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.doc
    }

    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub const fn controller(&self) -> &RelocationController {
        &self.controller
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current_source(&self) -> Option<&str> {
        self.current.as_ref().map(|found| found.source.as_str())
    }

    /// How many times the page has been scanned.
    pub const fn scans(&self) -> usize {
        self.scans
    }

    /// Enabling installs the stylesheet and scans right away. Disabling
    /// removes the stylesheet and every trace of the controller.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            info!("[agent] enabled");
            self.styles.install(&mut self.doc);
            self.check_page();
        } else {
            info!("[agent] disabled");
            OverlayStyles::uninstall(&mut self.doc);
            self.controller.teardown(&mut self.doc);
            self.current = None;
        }
    }

    /// Scan the page and (re)activate the controller when the player or its
    /// source changed. Returns whether an activation happened.
    pub fn check_page(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.scans += 1;
        let Some(found) = self.scanner.scan(&self.doc) else {
            return false;
        };
        let unchanged = self.current.as_ref() == Some(&found)
            && self.controller.container() == Some(found.container);
        if unchanged {
            debug!("[agent] player unchanged");
            return false;
        }
        self.controller
            .activate(&mut self.doc, found.container, &found.source);
        self.current = Some(found);
        true
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.controller.handle_event(&mut self.doc, event)
    }

    pub fn handle_message(&mut self, message: HostMessage) {
        match message {
            HostMessage::TogglePlugin { enabled } => self.set_enabled(enabled),
        }
    }

    /// Handle one event immediately, scans included.
    pub fn handle(&mut self, event: AgentEvent) {
        match event {
            AgentEvent::Message(message) => self.handle_message(message),
            AgentEvent::RawMessage(text) => match HostMessage::from_json(&text) {
                Ok(message) => self.handle_message(message),
                Err(err) => warn!("[agent] skipping message: {err:#}"),
            },
            AgentEvent::DomMutated => {
                self.check_page();
            }
            AgentEvent::Input(input) => {
                self.handle_input(&input);
            }
        }
    }

    /// Publish the mutations made since the last flush.
    pub fn flush(&mut self) -> Vec<DOMUpdate> {
        let batch = self.doc.flush();
        if !batch.is_empty() {
            debug!("[agent] flushed {} DOM updates", batch.len());
        }
        batch
    }

    /// Process events until the sender side closes, then hand the agent back.
    ///
    /// Mutation notices restart a quiet-period timer; the page is rescanned
    /// once it expires. A rescan still pending when the channel closes runs
    /// before returning.
    pub async fn run(mut self, mut events: mpsc::Receiver<AgentEvent>) -> Self {
        let debounce = self.config.scan_debounce();
        let mut deadline: Option<Instant> = None;
        loop {
            let pending = deadline;
            let rescan = async move {
                match pending {
                    Some(at) => time::sleep_until(at).await,
                    None => future::pending::<()>().await,
                }
            };
            tokio::select! {
                received = events.recv() => match received {
                    Some(AgentEvent::DomMutated) => {
                        deadline = Some(Instant::now() + debounce);
                    }
                    Some(event) => {
                        self.handle(event);
                        self.flush();
                    }
                    None => break,
                },
                () = rescan => {
                    deadline = None;
                    self.check_page();
                    self.flush();
                }
            }
        }
        if deadline.is_some() {
            self.check_page();
            self.flush();
        }
        debug!("[agent] event channel closed");
        self
    }
}
