//! Synchronous yes/no gate in front of destructive operations.

/// Asks the user to confirm a destructive operation.
pub trait ConfirmationGate {
    /// Return true to proceed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> ConfirmationGate for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Gate that approves everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmationGate for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Gate that declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl ConfirmationGate for NeverConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }
}

/// Prompt shown before deleting `count` records.
pub fn delete_prompt(label: &str, count: usize) -> String {
    if count == 1 {
        format!("Are you sure you want to delete this {}?", label.to_lowercase())
    } else {
        format!(
            "Are you sure you want to delete {} {} records?",
            count,
            label.to_lowercase()
        )
    }
}
