//! Role-specific supply-chain events.
//!
//! Producers fill one of these, then turn it into a [`Payload`]. Missing
//! required fields are rejected here and never reach the chain.

use crate::payload::Payload;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who recorded an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Harvest at the farm
    Farmer,
    /// Quality test
    Lab,
    /// Drying, grinding, packaging
    Processor,
}

impl Role {
    /// Name stored under the `role` key
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "Farmer",
            Self::Lab => "Lab",
            Self::Processor => "Processor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Producer-side rejection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A required field is blank
    #[error("{role} event is missing required field `{field}`")]
    MissingRequiredField {
        /// Role of the rejected event
        role: Role,
        /// Name of the blank field
        field: &'static str,
    },
}

/// Harvest record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestEvent {
    /// Farmer name
    pub farmer: String,
    /// Herb or crop
    pub herb: String,
    /// "lat,long"
    pub gps: String,
    /// Batch the harvest starts
    pub batch_id: String,
}

/// Lab quality test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabTestEvent {
    /// Batch under test
    pub batch_id: String,
    /// Lab name
    pub lab: String,
    /// DNA authentication passed
    pub dna_verified: bool,
    /// Pesticide level or free-form notes
    pub pesticide_level: String,
}

/// Processing step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingEvent {
    /// Batch being processed
    pub batch_id: String,
    /// Step name (Drying, Grinding, Packaging)
    pub process: String,
    /// Optional notes
    pub notes: String,
}

/// Any event a producer can submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleEvent {
    /// Recorded by a farmer
    Harvest(HarvestEvent),
    /// Recorded by a lab
    LabTest(LabTestEvent),
    /// Recorded by a processor
    Processing(ProcessingEvent),
}

impl RoleEvent {
    /// Role that produces this event
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Harvest(_) => Role::Farmer,
            Self::LabTest(_) => Role::Lab,
            Self::Processing(_) => Role::Processor,
        }
    }

    /// Batch the event belongs to
    #[must_use]
    pub fn batch_id(&self) -> &str {
        match self {
            Self::Harvest(e) => &e.batch_id,
            Self::LabTest(e) => &e.batch_id,
            Self::Processing(e) => &e.batch_id,
        }
    }

    /// Check required fields and build the ledger payload
    ///
    /// Text fields are trimmed. Keys follow the persisted layout for each role.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MissingRequiredField`] for the first blank
    /// required field
    pub fn into_payload(self) -> Result<Payload, EventError> {
        let role = self.role();
        let payload = Payload::new().with("role", role.as_str());

        let payload = match self {
            Self::Harvest(e) => payload
                .with("farmer", required(role, "farmer", &e.farmer)?)
                .with("herb", required(role, "herb", &e.herb)?)
                .with("gps", required(role, "gps", &e.gps)?)
                .with("batch_id", required(role, "batch_id", &e.batch_id)?),
            Self::LabTest(e) => payload
                .with("batch_id", required(role, "batch_id", &e.batch_id)?)
                .with("lab", required(role, "lab", &e.lab)?)
                .with("dna_verified", if e.dna_verified { "Yes" } else { "No" })
                .with("pesticide_level", e.pesticide_level.trim()),
            Self::Processing(e) => payload
                .with("batch_id", required(role, "batch_id", &e.batch_id)?)
                .with("process", required(role, "process", &e.process)?)
                .with("notes", e.notes.trim()),
        };
        Ok(payload)
    }
}

fn required<'a>(role: Role, field: &'static str, value: &'a str) -> Result<&'a str, EventError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EventError::MissingRequiredField { role, field });
    }
    Ok(trimmed)
}

impl From<HarvestEvent> for RoleEvent {
    fn from(e: HarvestEvent) -> Self {
        Self::Harvest(e)
    }
}

impl From<LabTestEvent> for RoleEvent {
    fn from(e: LabTestEvent) -> Self {
        Self::LabTest(e)
    }
}

impl From<ProcessingEvent> for RoleEvent {
    fn from(e: ProcessingEvent) -> Self {
        Self::Processing(e)
    }
}
