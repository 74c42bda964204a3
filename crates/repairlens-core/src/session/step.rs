//! Repair step model.

use serde::{Deserialize, Serialize};

/// A single instruction in a repair procedure.
///
/// Step identity is positional: `step` is 1-based and contiguous within a
/// list. Any stage that maps, filters or reorders steps must renumber them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairStep {
    /// 1-based position in the procedure.
    #[serde(default)]
    pub step: u32,
    /// What to do. Never empty in a finished result.
    pub instruction: String,
    /// Optional step-level caution, distinct from guide-level safety warnings.
    #[serde(default)]
    pub warning: Option<String>,
}

impl RepairStep {
    pub fn new(step: u32, instruction: impl Into<String>) -> Self {
        Self {
            step,
            instruction: instruction.into(),
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Rewrites step numbers to the contiguous 1..N sequence matching list
    /// position.
    pub fn renumber(steps: &mut [RepairStep]) {
        for (idx, step) in steps.iter_mut().enumerate() {
            step.step = idx as u32 + 1;
        }
    }

    /// Returns true when the numbers already form the 1..N sequence.
    pub fn is_contiguous(steps: &[RepairStep]) -> bool {
        steps
            .iter()
            .enumerate()
            .all(|(idx, s)| s.step == idx as u32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renumber_restores_contiguous_sequence() {
        let mut steps = vec![
            RepairStep::new(7, "Remove the battery"),
            RepairStep::new(0, "Disconnect the ribbon cable"),
            RepairStep::new(7, "Lift the board"),
        ];
        assert!(!RepairStep::is_contiguous(&steps));

        RepairStep::renumber(&mut steps);

        assert!(RepairStep::is_contiguous(&steps));
        assert_eq!(
            steps.iter().map(|s| s.step).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn renumber_on_empty_list_is_a_noop() {
        let mut steps: Vec<RepairStep> = Vec::new();
        RepairStep::renumber(&mut steps);
        assert!(steps.is_empty());
        assert!(RepairStep::is_contiguous(&steps));
    }

    #[test]
    fn missing_step_number_defaults_to_zero_on_parse() {
        let step: RepairStep =
            serde_json::from_str(r#"{"instruction": "Open the case"}"#).unwrap();
        assert_eq!(step.step, 0);
        assert_eq!(step.instruction, "Open the case");
        assert!(step.warning.is_none());
    }
}
