//! sea-orm entity definitions for the field-visit schema.

pub mod branch;
pub mod branch_recipient;
pub mod company;
pub mod user;
pub mod visit;
pub mod visit_cash;
pub mod visit_inventory_item;
pub mod visit_note;

pub use branch::Entity as Branch;
pub use branch_recipient::Entity as BranchRecipient;
pub use company::Entity as Company;
pub use user::Entity as User;
pub use visit::Entity as Visit;
pub use visit_cash::Entity as VisitCash;
pub use visit_inventory_item::Entity as VisitInventoryItem;
pub use visit_note::Entity as VisitNote;
