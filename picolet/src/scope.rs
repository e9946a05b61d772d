//! Call frames and the scope stack.
//!
//! Variables live in frames; the bottom frame is the global scope and exists
//! for the life of the interpreter.  A frame is pushed when a procedure is
//! invoked and popped when it returns.  Lookups see only the top frame:
//! procedures do not inherit their caller's variables.

use indexmap::IndexMap;

/// One call frame: the variables of a single lexical scope.
#[derive(Debug, Default)]
struct CallFrame {
    vars: IndexMap<String, String>,
}

/// The stack of call frames.
#[derive(Debug)]
pub(crate) struct ScopeStack {
    stack: Vec<CallFrame>,
}

impl ScopeStack {
    /// Creates the stack with the global frame already in place.
    pub fn new() -> ScopeStack {
        ScopeStack {
            stack: vec![CallFrame::default()],
        }
    }

    /// Pushes a fresh frame for a procedure invocation.
    pub fn push(&mut self) {
        self.stack.push(CallFrame::default());
    }

    /// Pops the top frame.  Popping the global frame is a programming error.
    pub fn pop(&mut self) {
        assert!(self.stack.len() > 1, "attempted to pop the global call frame");
        self.stack.pop();
    }

    /// Looks a variable up in the top frame only.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.top().vars.get(name).map(String::as_str)
    }

    /// Sets a variable in the top frame, creating it if needed.
    pub fn set(&mut self, name: &str, value: &str) {
        self.top_mut().vars.insert(name.to_string(), value.to_string());
    }

    /// The current scope level; the global frame is level 0.
    pub fn current(&self) -> usize {
        self.stack.len() - 1
    }

    fn top(&self) -> &CallFrame {
        self.stack.last().expect("the global call frame is always present")
    }

    fn top_mut(&mut self) -> &mut CallFrame {
        self.stack.last_mut().expect("the global call frame is always present")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let mut scopes = ScopeStack::new();
        scopes.set("a", "1");
        assert_eq!(scopes.get("a"), Some("1"));
        scopes.set("a", "2");
        assert_eq!(scopes.get("a"), Some("2"));
    }

    #[test]
    fn lookups_see_only_the_top_frame() {
        let mut scopes = ScopeStack::new();
        scopes.set("a", "global");

        scopes.push();
        assert_eq!(scopes.get("a"), None);
        scopes.set("a", "local");
        assert_eq!(scopes.get("a"), Some("local"));

        scopes.pop();
        assert_eq!(scopes.get("a"), Some("global"));
    }

    #[test]
    fn level_tracks_pushes_and_pops() {
        let mut scopes = ScopeStack::new();
        assert_eq!(scopes.current(), 0);
        scopes.push();
        scopes.push();
        assert_eq!(scopes.current(), 2);
        scopes.pop();
        assert_eq!(scopes.current(), 1);
    }

    #[test]
    #[should_panic(expected = "global call frame")]
    fn popping_the_global_frame_panics() {
        let mut scopes = ScopeStack::new();
        scopes.pop();
    }
}
