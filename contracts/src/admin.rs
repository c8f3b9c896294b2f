//! Two-step admin handover.
//!
//! The active admin nominates a candidate with `set_pending_admin`; the
//! candidate becomes admin only by calling `accept_admin` itself.

use odra::prelude::*;
use crate::errors::LendingError;
use crate::events::{NewAdmin, NewPendingAdmin};
use crate::types::AdminState;

/// Handover phase of an [`AdminRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPhase {
    Active(Address),
    PendingHandover { admin: Address, candidate: Address },
}

impl From<&AdminState> for AdminPhase {
    fn from(state: &AdminState) -> Self {
        match state.pending_admin {
            Some(candidate) => AdminPhase::PendingHandover {
                admin: state.admin,
                candidate,
            },
            None => AdminPhase::Active(state.admin),
        }
    }
}

/// Admin registry embedded in each vault
#[odra::module(events = [NewPendingAdmin, NewAdmin])]
pub struct AdminRegistry {
    state: Var<AdminState>,
}

#[odra::module]
impl AdminRegistry {
    pub fn init(&mut self, admin: Address) {
        if self.state.get().is_some() {
            self.env().revert(LendingError::AlreadyInitialized);
        }
        self.state.set(AdminState {
            admin,
            pending_admin: None,
        });
    }

    pub fn admin(&self) -> Address {
        self.state().admin
    }

    pub fn pending_admin(&self) -> Option<Address> {
        self.state().pending_admin
    }

    /// Nominate (or with `None`, withdraw the nomination of) the next admin.
    pub fn set_pending_admin(&mut self, candidate: Option<Address>) {
        self.require_admin();
        let mut state = self.state();
        let old_pending_admin = state.pending_admin;
        state.pending_admin = candidate;
        self.state.set(state);

        self.env().emit_event(NewPendingAdmin {
            old_pending_admin,
            new_pending_admin: candidate,
        });
    }

    /// Complete the handover; callable only by the pending admin.
    pub fn accept_admin(&mut self) {
        let caller = self.env().caller();
        let old_admin = match self.phase() {
            AdminPhase::PendingHandover { admin, candidate } if candidate == caller => admin,
            _ => self.env().revert(LendingError::NotAdmin),
        };

        self.state.set(AdminState {
            admin: caller,
            pending_admin: None,
        });

        self.env().emit_event(NewPendingAdmin {
            old_pending_admin: Some(caller),
            new_pending_admin: None,
        });
        self.env().emit_event(NewAdmin {
            old_admin,
            new_admin: caller,
        });
    }
}

impl AdminRegistry {
    pub fn phase(&self) -> AdminPhase {
        AdminPhase::from(&self.state())
    }

    pub fn require_admin(&self) {
        let admin = match self.phase() {
            AdminPhase::Active(admin) | AdminPhase::PendingHandover { admin, .. } => admin,
        };
        if self.env().caller() != admin {
            self.env().revert(LendingError::NotAdmin);
        }
    }

    fn state(&self) -> AdminState {
        match self.state.get() {
            Some(state) => state,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }
}
