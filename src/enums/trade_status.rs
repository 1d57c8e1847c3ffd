use num_enum::{TryFromPrimitive, IntoPrimitive};
use serde_repr::{Serialize_repr, Deserialize_repr};
use strum::{Display, EnumString};

/// The status of a trade after an offer has been accepted.
#[derive(Debug, Serialize_repr, Deserialize_repr, Display, EnumString, PartialEq, Eq, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum TradeStatus {
    Init = 0,
    PreCommitted = 1,
    Committed = 2,
    Complete = 3,
    Failed = 4,
    PartialSupportRollback = 5,
    FullSupportRollback = 6,
    SupportRollbackSelective = 7,
    RollbackFailed = 8,
    RollbackAbandoned = 9,
    InEscrow = 10,
    EscrowRollback = 11,
}

impl TradeStatus {
    /// Steam is still moving the items.
    pub fn is_processing(&self) -> bool {
        *self < Self::Complete
    }
    
    /// Anything past [`TradeStatus::Complete`] means the items did not arrive as expected.
    pub fn is_failed(&self) -> bool {
        *self > Self::Complete
    }
}
