pub mod clock;
pub mod envelope;
pub mod handler;

pub use clock::{Clock, FixedClock, SystemClock};
pub use envelope::{LexEvent, LexResponse, Message, WireDialogAction, DIALOG_CODE_HOOK};
pub use handler::{DialogHandler, HandlerError, HandlerResult};
