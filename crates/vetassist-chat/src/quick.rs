//! Canned veterinary questions offered as one-tap shortcuts.

use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAction {
    Symptoms,
    Treatment,
    Prevention,
    Emergency,
}

impl QuickAction {
    pub const ALL: [QuickAction; 4] = [
        QuickAction::Symptoms,
        QuickAction::Treatment,
        QuickAction::Prevention,
        QuickAction::Emergency,
    ];

    /// The question placed in the input field.
    pub fn prompt(self) -> &'static str {
        match self {
            QuickAction::Symptoms => "What are the common symptoms I should look for in sick animals?",
            QuickAction::Treatment => {
                "Can you guide me through basic treatment options for common animal diseases?"
            }
            QuickAction::Prevention => "What prevention measures should I take to keep my animals healthy?",
            QuickAction::Emergency => "I think my animal has an emergency. What should I do immediately?",
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuickAction::Symptoms => "symptoms",
            QuickAction::Treatment => "treatment",
            QuickAction::Prevention => "prevention",
            QuickAction::Emergency => "emergency",
        };
        f.write_str(name)
    }
}

impl FromStr for QuickAction {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symptoms" => Ok(QuickAction::Symptoms),
            "treatment" => Ok(QuickAction::Treatment),
            "prevention" => Ok(QuickAction::Prevention),
            "emergency" => Ok(QuickAction::Emergency),
            _ => Err(ChatError::UnknownQuickAction(s.to_string())),
        }
    }
}
