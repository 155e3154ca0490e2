// Domain records persisted in the document store, plus the input types that
// normalize what clients send.
pub mod audit;
pub mod comment;
pub mod customer;
pub mod name;
pub mod notification;
pub mod payment;
pub mod performance;
pub mod refs;
pub mod revenue;
pub mod role;
pub mod sale;
pub mod setting;
pub mod target;
pub mod user;

pub use audit::AuditLog;
pub use comment::Comment;
pub use customer::{Customer, CustomerStatus};
pub use name::{NameInput, NormalizedName};
pub use notification::Notification;
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use performance::{Performance, PerformancePeriod};
pub use refs::{CustomerRef, SaleRef, UserRef};
pub use revenue::Revenue;
pub use role::Role;
pub use sale::{Sale, SaleStatus};
pub use setting::Setting;
pub use target::{Target, TargetPeriod, TargetStatus};
pub use user::{PublicUser, User};
