//! graph-lens-session: hosts the graph-lens core for an interactive viewer.
//!
//! Owns the loaded graph, the selection list and render bookkeeping in a
//! single `Session` value. Source edits, node activations, mode and hop
//! changes and render completions go in; `View` snapshots come out.
//! Settings come from TOML, preferences persist as JSON, and sources can
//! be shared as compressed URL-safe links.

mod codec;
mod generation;
mod load;
mod neighborhood;
mod prefs;
mod render;
mod session;
mod settings;
mod state;
mod status;
mod util;

pub use codec::{decode, encode, try_decode, CodecError};
pub use generation::{Generations, RenderTicket};
pub use load::{load_source, reconcile, LoadError};
pub use neighborhood::{NeighborRow, QueryError};
pub use prefs::{Preferences, PrefsError};
pub use render::{sanitize, Recorded, RenderError, RenderedGraph, Renderer};
pub use session::{RenderRequest, Session, SessionError};
pub use settings::{Settings, SettingsError};
pub use state::GraphState;
pub use status::Status;
pub use util::{direction_str, parse_direction, ParseDirectionError};
