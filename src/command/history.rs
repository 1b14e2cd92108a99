use super::{Command, CommandContext, CommandResult};
use crate::observable::{ListenerId, ObservableCell};

/// Undo/redo stacks for one document.
///
/// `undo_available` and `redo_available` are observable so toolbar buttons
/// can follow them; both are updated before `execute`, `undo` and `redo`
/// return.
#[derive(Debug)]
pub struct CommandHistory {
    /// Commands that can be undone, most recent last
    undo_stack: Vec<Box<dyn Command>>,
    /// Commands that can be redone, most recent last
    redo_stack: Vec<Box<dyn Command>>,
    undo_available: ObservableCell<bool>,
    redo_available: ObservableCell<bool>,
    /// Oldest commands are dropped beyond this depth (0 = unlimited)
    max_undo_depth: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub const DEFAULT_MAX_UNDO_DEPTH: usize = 100;

    pub fn new() -> Self {
        Self::with_max_undo_depth(Self::DEFAULT_MAX_UNDO_DEPTH)
    }

    pub fn with_max_undo_depth(max_undo_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            undo_available: ObservableCell::new(false),
            redo_available: ObservableCell::new(false),
            max_undo_depth,
        }
    }

    /// Runs `command` and records it. A command whose `run` fails is not
    /// recorded and the error is returned to the caller.
    pub fn execute(&mut self, mut command: Box<dyn Command>, ctx: &mut CommandContext<'_>) -> CommandResult {
        if let Err(err) = command.run(ctx) {
            log::warn!("{} failed: {err}", command.description());
            return Err(err);
        }
        log::info!("Executed: {}", command.description());
        self.add(command);
        Ok(())
    }

    /// Records a command whose effect has already been applied. Clears the
    /// redo stack.
    pub fn add(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.trim();
        self.update_flags();
    }

    /// Undoes the most recent command. Returns `Ok(false)` when there is
    /// nothing to undo.
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<bool> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.undo(ctx) {
            log::warn!("Undo of {} failed: {err}", command.description());
            self.undo_stack.push(command);
            return Err(err);
        }
        log::info!("Undone: {}", command.description());
        self.redo_stack.push(command);
        self.update_flags();
        Ok(true)
    }

    /// Runs the most recently undone command again. It goes through the same
    /// path as [`execute`](Self::execute), so the rest of the redo stack is
    /// dropped. A failing run leaves the command on the redo stack.
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.run(ctx) {
            log::warn!("Redo of {} failed: {err}", command.description());
            self.redo_stack.push(command);
            return Err(err);
        }
        log::info!("Redone: {}", command.description());
        self.add(command);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo_depth(&self) -> usize {
        self.max_undo_depth
    }

    pub fn set_max_undo_depth(&mut self, depth: usize) {
        self.max_undo_depth = depth;
        self.trim();
        self.update_flags();
    }

    /// Forgets all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.update_flags();
    }

    pub fn on_undo_available(&self, listener: impl Fn(&bool) + 'static) -> ListenerId {
        self.undo_available.subscribe(listener)
    }

    pub fn on_redo_available(&self, listener: impl Fn(&bool) + 'static) -> ListenerId {
        self.redo_available.subscribe(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.undo_available.unsubscribe(id) || self.redo_available.unsubscribe(id)
    }

    fn trim(&mut self) {
        if self.max_undo_depth > 0 && self.undo_stack.len() > self.max_undo_depth {
            let excess = self.undo_stack.len() - self.max_undo_depth;
            self.undo_stack.drain(..excess);
        }
    }

    fn update_flags(&mut self) {
        let can_undo = self.can_undo();
        let can_redo = self.can_redo();
        self.undo_available.set(can_undo);
        self.redo_available.set(can_redo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandError;
    use crate::document::Document;
    use crate::event::EventBus;
    use crate::selection::SelectionModel;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Adds `amount` to a shared counter.
    #[derive(Debug)]
    struct Add {
        counter: Rc<Cell<i32>>,
        amount: i32,
    }

    impl Command for Add {
        fn run(&mut self, _ctx: &mut CommandContext<'_>) -> CommandResult {
            self.counter.set(self.counter.get() + self.amount);
            Ok(())
        }

        fn undo(&mut self, _ctx: &mut CommandContext<'_>) -> CommandResult {
            self.counter.set(self.counter.get() - self.amount);
            Ok(())
        }

        fn description(&self) -> String {
            format!("Add {}", self.amount)
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Command for Failing {
        fn run(&mut self, _ctx: &mut CommandContext<'_>) -> CommandResult {
            Err(CommandError::NotEnoughShapes {
                required: 2,
                actual: 0,
            })
        }

        fn undo(&mut self, _ctx: &mut CommandContext<'_>) -> CommandResult {
            Ok(())
        }

        fn description(&self) -> String {
            "Failing".to_string()
        }
    }

    struct Harness {
        document: Document,
        selection: SelectionModel<crate::shape::ShapeId>,
        bus: EventBus,
        counter: Rc<Cell<i32>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                document: Document::new(),
                selection: SelectionModel::new(),
                bus: EventBus::new(),
                counter: Rc::new(Cell::new(0)),
            }
        }

        fn add(&self, amount: i32) -> Box<dyn Command> {
            Box::new(Add {
                counter: Rc::clone(&self.counter),
                amount,
            })
        }

        fn ctx(&mut self) -> CommandContext<'_> {
            CommandContext::new(&mut self.document, &self.selection, &self.bus)
        }
    }

    #[test]
    fn redo_drops_remaining_redo_entries() {
        let mut h = Harness::new();
        let mut history = CommandHistory::new();
        for amount in [1, 10, 100] {
            let cmd = h.add(amount);
            history.execute(cmd, &mut h.ctx()).unwrap();
        }
        assert_eq!(h.counter.get(), 111);

        assert!(history.undo(&mut h.ctx()).unwrap());
        assert!(history.undo(&mut h.ctx()).unwrap());
        assert_eq!(h.counter.get(), 1);
        assert_eq!(history.redo_depth(), 2);

        assert!(history.redo(&mut h.ctx()).unwrap());
        assert_eq!(h.counter.get(), 11);
        assert!(!history.can_redo());
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.undo_description().as_deref(), Some("Add 10"));
        assert!(!history.redo(&mut h.ctx()).unwrap());
    }

    #[test]
    fn failed_redo_stays_on_redo_stack() {
        let mut h = Harness::new();
        let mut history = CommandHistory::new();
        history.redo_stack.push(Box::new(Failing));
        assert!(history.redo(&mut h.ctx()).is_err());
        assert_eq!(history.redo_depth(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn failed_run_is_not_recorded() {
        let mut h = Harness::new();
        let mut history = CommandHistory::new();
        assert!(history.execute(Box::new(Failing), &mut h.ctx()).is_err());
        assert!(!history.can_undo());
        assert!(!history.undo(&mut h.ctx()).unwrap());
    }

    #[test]
    fn max_depth_drops_oldest() {
        let mut h = Harness::new();
        let mut history = CommandHistory::with_max_undo_depth(2);
        for amount in [1, 2, 3] {
            let cmd = h.add(amount);
            history.execute(cmd, &mut h.ctx()).unwrap();
        }
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo_description().as_deref(), Some("Add 3"));

        history.set_max_undo_depth(1);
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn availability_flags_notify_on_transitions() {
        let mut h = Harness::new();
        let mut history = CommandHistory::new();
        let undo_seen = Rc::new(Cell::new(0));
        let redo_seen = Rc::new(Cell::new(0));
        let u = Rc::clone(&undo_seen);
        history.on_undo_available(move |_| u.set(u.get() + 1));
        let r = Rc::clone(&redo_seen);
        history.on_redo_available(move |_| r.set(r.get() + 1));

        let first = h.add(1);
        history.execute(first, &mut h.ctx()).unwrap();
        let second = h.add(2);
        history.execute(second, &mut h.ctx()).unwrap();
        assert_eq!(undo_seen.get(), 1);

        history.undo(&mut h.ctx()).unwrap();
        history.undo(&mut h.ctx()).unwrap();
        assert_eq!(undo_seen.get(), 2);
        assert_eq!(redo_seen.get(), 1);

        history.clear();
        assert_eq!(redo_seen.get(), 2);
    }
}
