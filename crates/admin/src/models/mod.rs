//! Domain models for the back-office.

pub mod checklist;
pub mod listing;
pub mod master_list;
pub mod purchase_order;
pub mod submission;

pub use checklist::{Checklist, ChecklistItem, ConvertOptions};
pub use listing::{ListingQuery, SortDirection, SortKey, SubmissionView};
pub use master_list::{
    Destination, ItemFilter, ItemPatch, MasterList, NewMasterList, StockItem, ThresholdConfig,
    TransferMode, TransferRequest,
};
pub use purchase_order::{NewOrder, PurchaseOrderLine};
pub use submission::{
    Action, NewSubmittedItem, Owner, SubmissionSummary, SubmittedItem, SubmittedItemPatch,
    SubmittedList, TransitionError,
};
