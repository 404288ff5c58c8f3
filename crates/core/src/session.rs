//! Staff role selection.
//!
//! The console starts on a role picker; the choice is remembered under `selectedRole` so the
//! next session opens on the same role. Menus and permissions per role are not modelled here.

use crate::constants::SELECTED_ROLE_KEY;
use crate::error::{WardError, WardResult};
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "recepcionista")]
    Receptionist,
    #[serde(rename = "medico")]
    Doctor,
    #[serde(rename = "enfermeria")]
    Nurse,
    #[serde(rename = "farmacia")]
    Pharmacy,
    #[serde(rename = "laboratorio")]
    Laboratory,
    #[serde(rename = "imagenes")]
    Imaging,
    #[serde(rename = "presupuesto")]
    Budgeting,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Receptionist,
        Role::Doctor,
        Role::Nurse,
        Role::Pharmacy,
        Role::Laboratory,
        Role::Imaging,
        Role::Budgeting,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Role::Receptionist => "recepcionista",
            Role::Doctor => "medico",
            Role::Nurse => "enfermeria",
            Role::Pharmacy => "farmacia",
            Role::Laboratory => "laboratorio",
            Role::Imaging => "imagenes",
            Role::Budgeting => "presupuesto",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Role::Receptionist => "Recepción",
            Role::Doctor => "Médico",
            Role::Nurse => "Enfermería",
            Role::Pharmacy => "Farmacia",
            Role::Laboratory => "Laboratorio",
            Role::Imaging => "Imágenes",
            Role::Budgeting => "Presupuesto",
        }
    }
}

impl FromStr for Role {
    type Err = WardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.key() == wanted)
            .ok_or_else(|| WardError::InvalidInput(format!("unknown role '{}'", s.trim())))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Remembers the selected role in the backing store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the stored role; unreadable or unknown values count as no selection.
    pub fn selected_role(&self) -> Option<Role> {
        let text = match self.store.get(SELECTED_ROLE_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%error, "failed to read selected role");
                return None;
            }
        };

        match serde_json::from_str::<Role>(&text) {
            Ok(role) => Some(role),
            Err(error) => {
                tracing::warn!(%error, "stored role is malformed, ignoring it");
                None
            }
        }
    }

    pub fn select_role(&self, role: Role) -> WardResult<()> {
        let text = serde_json::to_string(&role).map_err(WardError::Serialization)?;
        self.store.set(SELECTED_ROLE_KEY, &text)?;
        tracing::info!(role = role.key(), "role selected");
        Ok(())
    }

    pub fn clear_role(&self) -> WardResult<()> {
        self.store.remove(SELECTED_ROLE_KEY)?;
        Ok(())
    }
}
