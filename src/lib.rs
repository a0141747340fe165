//! # Keiro - Flow Graph Editor Core
//!
//! **Keiro** is the synchronization core for node-based workflow editors: it
//! keeps a human-editable node/edge diagram and a canonical, persistable
//! workflow definition mutually consistent under arbitrary, interleaved user
//! edits (drag, connect, rename, delete, reconfigure), while enforcing the
//! structural invariants of the definition on every mutation.
//!
//! ## Core Workflow
//!
//! The crate is transport-agnostic. It operates on a canonical internal
//! model of a "flow definition." The primary workflow is:
//!
//! 1.  **Load Your Flow**: Parse whatever envelope your flow service returns
//!     into your own Rust structs.
//! 2.  **Convert to Keiro's Model**: Implement the `IntoFlow` trait for your
//!     structs to provide a translation layer into a canonical `LoadedFlow`.
//! 3.  **Open a Session**: Create an `EditorStore` from the loaded flow. The
//!     store derives the visual node/edge collections (running a one-time
//!     auto-layout when the definition has no stored positions) and owns
//!     them for the rest of the session.
//! 4.  **Drive It**: Feed the store the primitive gestures your rendering
//!     surface reports (node moved, connection drawn, edge removed, step
//!     renamed) and render its `nodes()`/`edges()` collections. Hand
//!     `flow()` to your save service whenever `is_dirty()` is set.
//!
//! ## Quick Start
//!
//! ```rust
//! use keiro::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Build a flow definition (normally fetched from the flow service).
//!     let mut definition = FlowDefinition::new("quality-intake");
//!     definition.steps.insert(
//!         "fetch".to_string(),
//!         StepInstance::new("fetch", StepConfig::Task(TaskConfig::default())),
//!     );
//!     definition.start_step_instance_id = "fetch".to_string();
//!
//!     // 2. Open an editing session.
//!     let mut store = EditorStore::load(LoadedFlow::new(definition, "Quality intake", ""));
//!
//!     // 3. Drive it with gestures from the rendering surface.
//!     let template = NodeTemplate {
//!         display_name: "Collect results".to_string(),
//!         config: StepConfig::Task(TaskConfig::default()),
//!     };
//!     let collect_id = store.add_node(&template, Position::new(120.0, 240.0));
//!     store.connect("fetch", &collect_id, Anchor::BottomCenter, Anchor::TopCenter);
//!     assert!(store.is_dirty());
//!
//!     // 4. Persist: hand the definition to the save service, then acknowledge.
//!     let payload = store.flow().to_json()?;
//!     // ... PUT `payload` to the flow service ...
//!     store.clear_dirty_state();
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod flow;
pub mod geometry;
pub mod graph;
pub mod prelude;
pub mod store;
