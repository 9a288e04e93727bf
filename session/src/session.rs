//! The session host: owns the parsed graph, the selection list and the
//! render bookkeeping, and turns user input events into `View` snapshots.
//!
//! Everything runs on the caller's thread. The only asynchronous boundary
//! is the renderer, which is driven through `begin_render`/`finish_render`
//! so that a slow render cannot overwrite the result of a newer one.

use std::path::PathBuf;

use graph_lens_core::{
    compute_view, validate, HopLimit, Marker, Mode, Selection, SelectionStore, View,
};

use crate::codec::{self, CodecError};
use crate::generation::{Generations, RenderTicket};
use crate::load::{self, LoadError};
use crate::prefs::{Preferences, PrefsError};
use crate::render::{sanitize, RenderError, RenderedGraph, Renderer};
use crate::settings::Settings;
use crate::state::GraphState;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Prefs(#[from] PrefsError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Source text to hand to the renderer, with the ticket its completion
/// must present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub ticket: RenderTicket,
    pub source: String,
}

#[derive(Debug)]
pub struct Session {
    settings: Settings,
    prefs: Preferences,
    prefs_path: Option<PathBuf>,
    state: Option<GraphState>,
    selections: SelectionStore,
    mode: Mode,
    max_hops: HopLimit,
    /// Edited source not yet applied (auto-apply off).
    pending: Option<String>,
    generations: Generations,
    load_error: Option<LoadError>,
    render_error: Option<RenderError>,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            prefs: Preferences {
                auto_apply: settings.auto_apply_default,
            },
            prefs_path: None,
            state: None,
            selections: SelectionStore::new(),
            mode: settings.default_mode,
            max_hops: settings.default_hop_limit(),
            pending: None,
            generations: Generations::new(),
            load_error: None,
            render_error: None,
            settings,
        }
    }

    /// Read preferences from `path` and write changes back to it.
    pub fn with_preferences(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.prefs = Preferences::load(&path, self.prefs);
        self.prefs_path = Some(path);
        self
    }

    /// Toggle auto-apply and persist the choice. Turning it on applies any
    /// pending edit; if that edit does not load, the preference is still
    /// saved and the load error is returned.
    pub fn set_auto_apply(&mut self, on: bool) -> Result<(), SessionError> {
        if self.prefs.auto_apply != on {
            self.prefs.auto_apply = on;
            if let Some(path) = &self.prefs_path {
                self.prefs.save(path)?;
            }
        }
        if on {
            self.apply_pending()?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Source
    // -----------------------------------------------------------------------

    /// Receive edited source from the editor.
    ///
    /// With auto-apply on the text is applied at once; otherwise it is only
    /// validated for markers and held until `apply_pending`. Returns whether
    /// the text was applied.
    pub fn edit_source(&mut self, text: impl Into<String>) -> Result<bool, LoadError> {
        let text = text.into();
        if self.prefs.auto_apply {
            self.apply_source(&text)?;
            return Ok(true);
        }

        self.load_error = validate(&sanitize(&text)).err().map(LoadError::Invalid);
        self.pending = Some(text);
        Ok(false)
    }

    /// Apply the held edit, if any. Returns whether there was one.
    pub fn apply_pending(&mut self) -> Result<bool, LoadError> {
        match self.pending.take() {
            Some(text) => {
                let result = self.apply_source(&text);
                if result.is_err() {
                    self.pending = Some(text);
                }
                result.map(|()| true)
            }
            None => Ok(false),
        }
    }

    /// Parse `text` and make it the current graph. Selections are cleared.
    ///
    /// On failure the previous graph stays loaded and the error is kept for
    /// `markers`.
    pub fn apply_source(&mut self, text: &str) -> Result<(), LoadError> {
        let generation = self.generations.source() + 1;
        match load::load_source(text, &self.settings, generation) {
            Ok(state) => {
                self.generations.bump_source();
                self.state = Some(state);
                self.selections.clear();
                self.pending = None;
                self.load_error = None;
                self.render_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("graph_lens: keeping previous graph: {}", e);
                self.load_error = Some(e.clone());
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// A node was clicked. `additive` is true while the modifier key is
    /// held.
    pub fn activate(&mut self, node_id: &str, additive: bool) -> View {
        if self.mode == Mode::All {
            tracing::debug!("graph_lens: ignoring '{}' in mode all", node_id);
            return self.view();
        }
        if self.selections.activate(node_id, self.mode, self.max_hops, additive) {
            tracing::debug!(
                "graph_lens: activated '{}' ({}, {} hops, additive={})",
                node_id,
                self.mode,
                self.max_hops,
                additive
            );
        }
        self.view()
    }

    /// Switch traversal mode for new and existing selections. Mode `all`
    /// drops every selection.
    pub fn set_mode(&mut self, mode: Mode) -> View {
        self.mode = mode;
        if mode == Mode::All {
            self.selections.clear();
        } else {
            self.selections.update_mode(mode);
        }
        self.view()
    }

    /// Raw input from the hop control; unusable input falls back to the
    /// configured default.
    pub fn set_max_hops(&mut self, input: &str) -> View {
        self.max_hops = HopLimit::parse_or(input, self.settings.default_hop_limit());
        self.selections.update_hop_setting(self.max_hops);
        self.view()
    }

    /// Escape: drop every selection.
    pub fn cancel(&mut self) -> View {
        self.selections.clear();
        self.view()
    }

    /// Drop every selection and restore the configured mode and hop limit.
    pub fn reset(&mut self) -> View {
        self.selections.clear();
        self.mode = self.settings.default_mode;
        self.max_hops = self.settings.default_hop_limit();
        self.view()
    }

    pub fn view(&self) -> View {
        match &self.state {
            Some(state) => compute_view(
                &state.adjacency,
                state.model.clusters(),
                self.selections.selections(),
            ),
            None => View::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Start a render of the current graph. Any render still in flight is
    /// superseded.
    pub fn begin_render(&mut self) -> Option<RenderRequest> {
        let source = self.state.as_ref()?.source.clone();
        let ticket = self.generations.issue();
        Some(RenderRequest { ticket, source })
    }

    /// Deliver a render result. Returns the overlay to reapply, or `None`
    /// when the ticket is stale.
    pub fn finish_render(
        &mut self,
        ticket: RenderTicket,
        result: Result<RenderedGraph, RenderError>,
    ) -> Option<View> {
        if !self.generations.complete(ticket) {
            return None;
        }
        match result {
            Ok(rendered) => {
                if let Some(state) = self.state.as_mut() {
                    load::reconcile(state, &rendered);
                }
                self.render_error = None;
            }
            Err(e) => {
                tracing::warn!("graph_lens: render failed: {}", e);
                self.render_error = Some(e);
            }
        }
        Some(self.view())
    }

    /// Render synchronously with `renderer`.
    pub fn render_with(&mut self, renderer: &mut dyn Renderer) -> Option<View> {
        let request = self.begin_render()?;
        let result = renderer.render(&request.source);
        self.finish_render(request.ticket, result)
    }

    // -----------------------------------------------------------------------
    // Sharing
    // -----------------------------------------------------------------------

    /// The text in the editor: the held edit, else the loaded source.
    pub fn current_source(&self) -> &str {
        self.pending
            .as_deref()
            .or_else(|| self.state.as_ref().map(|s| s.source.as_str()))
            .unwrap_or_default()
    }

    pub fn share(&self) -> Result<String, CodecError> {
        codec::encode(self.current_source())
    }

    /// Load source from a shared link; an undecodable link loads `default`.
    pub fn open_shared(&mut self, encoded: &str, default: &str) -> Result<(), LoadError> {
        let source = codec::decode(encoded, default);
        self.apply_source(&source)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Inline editor markers for the last load and render failures.
    pub fn markers(&self) -> Vec<Marker> {
        let mut markers = Vec::new();
        match &self.load_error {
            Some(LoadError::Invalid(e)) => markers.push(e.marker()),
            Some(e @ LoadError::TooLarge { .. }) => markers.push(Marker {
                line: 1,
                column: 1,
                message: e.to_string(),
            }),
            None => {}
        }
        if let Some(e) = &self.render_error {
            markers.push(Marker {
                line: e.line().unwrap_or(1),
                column: 1,
                message: e.message.clone(),
            });
        }
        markers
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn state(&self) -> Option<&GraphState> {
        self.state.as_ref()
    }

    pub fn selections(&self) -> &[Selection] {
        self.selections.selections()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn max_hops(&self) -> HopLimit {
        self.max_hops
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    pub fn render_error(&self) -> Option<&RenderError> {
        self.render_error.as_ref()
    }

    pub(crate) fn generations(&self) -> &Generations {
        &self.generations
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
