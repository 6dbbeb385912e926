pub mod clock;
pub mod currency;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use currency::{Currency, UnsupportedCurrency, format_minor_units};
pub use models::{
    Invoice, InvoiceMeta, InvoiceStatus, LineItem, Payment, PaymentStatus, RecurrenceEvery,
    RecurringSchedule, checked_items_total,
};
