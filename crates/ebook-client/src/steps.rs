use serde::{Deserialize, Serialize};

/// Pipeline stages shown to the user, in backend order
pub const STEP_LABELS: [&str; 6] = [
    "Web Search",
    "Data Analysis",
    "Image Generation",
    "Formatting",
    "PDF Creation",
    "Verification",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

/// Progress through the fixed step sequence. The cursor is the only stored
/// value; every step status is derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    cursor: usize,
}

impl StepState {
    pub fn len(&self) -> usize {
        STEP_LABELS.len()
    }

    pub fn is_empty(&self) -> bool {
        STEP_LABELS.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Advance by one step, holding at the last one. Returns the index of the
    /// step that was just completed.
    pub fn advance(&mut self) -> Option<usize> {
        if self.cursor + 1 >= STEP_LABELS.len() {
            return None;
        }

        let completed = self.cursor;
        self.cursor += 1;
        Some(completed)
    }

    /// Mark every step completed, including the last one
    pub fn complete(&mut self) {
        self.cursor = STEP_LABELS.len();
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == STEP_LABELS.len()
    }

    pub fn status(&self, index: usize) -> StepStatus {
        if index < self.cursor {
            StepStatus::Completed
        } else if index == self.cursor {
            StepStatus::Active
        } else {
            StepStatus::Pending
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, StepStatus)> + '_ {
        STEP_LABELS
            .iter()
            .enumerate()
            .map(|(index, label)| (*label, self.status(index)))
    }
}
