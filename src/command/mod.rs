//! Undoable document mutations.
//!
//! A [`Command`] captures enough state to apply and exactly reverse one
//! effect. [`CommandHistory`] runs commands against a [`CommandContext`] and
//! keeps the undo and redo stacks.

mod commands;
mod context;
mod history;

use std::fmt;

pub use crate::error::{CommandError, CommandResult};
pub use commands::{
    Alignment, AlignShapes, AppendShape, RelocateShapes, RemoveShapes, ResizeRelocateShape,
};
pub use context::CommandContext;
pub use history::CommandHistory;

/// A reversible document mutation.
///
/// Commands may snapshot pre-state on their first `run`; otherwise they are
/// immutable once built. `undo` must exactly reverse the preceding `run`.
pub trait Command: fmt::Debug {
    fn run(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult;

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult;

    /// Human readable label, e.g. for an "Undo ..." menu entry.
    fn description(&self) -> String;
}
