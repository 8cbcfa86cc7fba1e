//! Request bodies and their validation.
//!
//! Validation here only covers what the HTTP layer can judge on its own;
//! slot, level and ownership checks stay in `imperium-lib`.

use serde::{Deserialize, Serialize};

use imperium_lib::catalog::ResearchId;
use imperium_lib::{BlueprintDraft, BlueprintModule, PlanetId, PlayerId, QueueKind, ShipClass};

use crate::ProblemDetails;

/// Longest accepted blueprint name, in characters.
pub const MAX_NAME_LEN: usize = 64;
/// Largest quantity accepted in a single construction order.
pub const MAX_QUANTITY: u32 = 10_000;

pub trait Validate {
    /// Check the request; `request_id` fills the problem's `instance`.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// `POST /api/v1/blueprints/calculate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    /// Validate research against this player; without it research is
    /// reported against an empty research state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    pub ship_class: ShipClass,
    #[serde(default)]
    pub modules: Vec<BlueprintModule>,
}

impl Validate for CalculateRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        validate_module_count(self.ship_class, &self.modules, request_id)
    }
}

/// `POST` and `PUT` on a player's blueprints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveBlueprintRequest {
    pub name: String,
    pub ship_class: ShipClass,
    #[serde(default)]
    pub modules: Vec<BlueprintModule>,
}

impl SaveBlueprintRequest {
    pub fn into_draft(self) -> BlueprintDraft {
        BlueprintDraft {
            name: self.name.trim().to_string(),
            ship_class: self.ship_class,
            modules: self.modules,
        }
    }
}

impl Validate for SaveBlueprintRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'name' field is required and cannot be empty",
                request_id,
            )));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(Box::new(ProblemDetails::bad_request(
                format!("The 'name' field must be at most {MAX_NAME_LEN} characters"),
                request_id,
            )));
        }
        validate_module_count(self.ship_class, &self.modules, request_id)
    }
}

fn validate_module_count(
    class: ShipClass,
    modules: &[BlueprintModule],
    request_id: &str,
) -> Result<(), Box<ProblemDetails>> {
    let max_slots = class.profile().max_slots;
    if modules.len() > max_slots {
        return Err(Box::new(ProblemDetails::bad_request(
            format!(
                "{} modules exceed the {} slots of a {} blueprint",
                modules.len(),
                max_slots,
                class
            ),
            request_id,
        )));
    }
    Ok(())
}

/// `POST /api/v1/players/{player_id}/research`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResearchRequest {
    pub research_id: ResearchId,
}

impl Validate for StartResearchRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.research_id <= 0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'research_id' field must be a positive id",
                request_id,
            )));
        }
        Ok(())
    }
}

/// `POST /api/v1/players/{player_id}/construction`
///
/// `target_id` is a blueprint id for ship orders and a building type id for
/// building orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub kind: QueueKind,
    pub planet_id: PlanetId,
    pub target_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl Validate for EnqueueRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.quantity == 0 || self.quantity > MAX_QUANTITY {
            return Err(Box::new(ProblemDetails::bad_request(
                format!("The 'quantity' field must be between 1 and {MAX_QUANTITY}"),
                request_id,
            )));
        }
        Ok(())
    }
}
