//! # Inference Instructions
//!
//! The checks a pharmacist can ask for, plus the safety lines that are
//! always sent whether or not anything was ticked.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Appended to every request.
pub const HIDDEN_INSTRUCTIONS: [&str; 3] = [
    "Ensure patient safety is prioritized",
    "Highlight potential adverse drug events",
    "Check prescription compliance rigorously",
];

/// Sent in place of the user's selection when it is empty.
pub const NO_INSTRUCTIONS: &str = "No specific instructions.";

/// A selectable check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RxInstruction {
    CheckDosage,
    CheckDrugInteractions,
    CheckAllergies,
    MapCommonAllergies,
    #[serde(alias = "provide_patient_counseling_note")]
    ProvideCounselingNote,
    VerifyPrescriptionCompliance,
    RecommendSubstituteDrugs,
    PrintPosReceipt,
}

impl RxInstruction {
    /// Every instruction, in the order they are offered.
    pub const ALL: [RxInstruction; 8] = [
        RxInstruction::CheckDosage,
        RxInstruction::CheckDrugInteractions,
        RxInstruction::CheckAllergies,
        RxInstruction::MapCommonAllergies,
        RxInstruction::ProvideCounselingNote,
        RxInstruction::VerifyPrescriptionCompliance,
        RxInstruction::RecommendSubstituteDrugs,
        RxInstruction::PrintPosReceipt,
    ];

    /// The wording sent to the model.
    pub fn label(self) -> &'static str {
        match self {
            RxInstruction::CheckDosage => "Check dosage",
            RxInstruction::CheckDrugInteractions => "Check drug interactions",
            RxInstruction::CheckAllergies => "Check allergies",
            RxInstruction::MapCommonAllergies => "Map to common allergies",
            RxInstruction::ProvideCounselingNote => "Provide counseling note",
            RxInstruction::VerifyPrescriptionCompliance => "Verify prescription compliance",
            RxInstruction::RecommendSubstituteDrugs => "Recommend substitute drugs",
            RxInstruction::PrintPosReceipt => "Print as Standard PoS Receipt",
        }
    }
}

impl fmt::Display for RxInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Newline-joined instruction block: the selection (or
/// [`NO_INSTRUCTIONS`]) followed by [`HIDDEN_INSTRUCTIONS`].
pub fn instruction_text(selected: &[RxInstruction]) -> String {
    let mut lines: Vec<&str> = if selected.is_empty() {
        vec![NO_INSTRUCTIONS]
    } else {
        selected.iter().map(|i| i.label()).collect()
    };
    lines.extend(HIDDEN_INSTRUCTIONS);
    lines.join("\n")
}
