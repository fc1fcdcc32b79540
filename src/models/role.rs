use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::TransactionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Cashier,
}

/// Everything the access-control layer can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadCatalog,
    ManageCatalog,
    RecordSale,
    RecordRestock,
    /// `None` means the whole ledger, both types.
    ViewLedger(Option<TransactionKind>),
    ManageUsers,
}

impl Operation {
    pub fn record(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Sale => Operation::RecordSale,
            TransactionKind::Restock => Operation::RecordRestock,
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Cashier => "cashier",
        }
    }

    pub fn allows(&self, operation: Operation) -> bool {
        match self {
            Role::Manager => true,
            Role::Cashier => matches!(
                operation,
                Operation::ReadCatalog
                    | Operation::RecordSale
                    | Operation::ViewLedger(Some(TransactionKind::Sale))
            ),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Role::Manager),
            "cashier" => Ok(Role::Cashier),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}
