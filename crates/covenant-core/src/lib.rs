//! Shared types, errors, constants and canonical encoding for the Covenant
//! node-management overlay: the credential-gated command engine, conditional
//! escrow, obligation netting, dispute arbitration, bond lifecycle, and
//! marketplace state machine.

pub mod bond;
pub mod canonical;
pub mod constants;
pub mod contract;
pub mod credential;
pub mod error;
pub mod escrow;
pub mod marketplace;
pub mod obligation;
pub mod operation;
pub mod receipt;
pub mod types;

pub use bond::{Bond, BondPredicate, BondStatus, SlashRecord, Tier};
pub use contract::{Contract, ContractStatus, ContractWindows, PricingTerms, ServiceLevelAgreement};
pub use credential::{
    ConstraintMap, CredentialStatus, ManagementCredential, Permission, ResolvedIdentity,
    VerifiableCredential,
};
pub use error::CovenantError;
pub use escrow::{EscrowState, EscrowTicket, EscrowVariant, Secret, SpendingCondition};
pub use marketplace::{EventKind, EventTags, MarketplaceEvent, ServiceClass};
pub use obligation::{daily_window_id, Obligation, ObligationKind, ObligationStatus};
pub use operation::{OperationEnvelope, OperationStage, SubmitOutcome};
pub use receipt::{merkle_root, verify_chain, ExecutionResult, MerkleSummary, Receipt};
pub use types::{
    Amount, ContentHash, HashLock, Identifier, Nonce, PublicKey, Seq, Signature, Timestamp,
    WindowId,
};
