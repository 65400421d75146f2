//! Pipeline components, leaves first: C2 (`semantic_gate`), C6 (`forged`),
//! C7 (`insertion`). C1, C4 and C5 are collaborator-facing and live at
//! `crate::{state_store, signature, fee}`; C3 lives at `crate::handler`.

pub mod forged;
pub mod insertion;
pub mod semantic_gate;
