//! Confirmation capability for destructive actions

use async_trait::async_trait;

/// Actions that need the user's yes before they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearChat,
    NewSession,
}

impl ConfirmAction {
    pub fn prompt(self) -> &'static str {
        match self {
            ConfirmAction::ClearChat => "Are you sure you want to clear the chat history?",
            ConfirmAction::NewSession => {
                "Start a new session? Current chat will remain in history."
            }
        }
    }
}

/// Asks the user to confirm an action
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, action: ConfirmAction) -> bool;
}

/// Answers every prompt the same way
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, _action: ConfirmAction) -> bool {
        self.0
    }
}
