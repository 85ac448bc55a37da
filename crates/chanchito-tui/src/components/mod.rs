pub mod confirm_dialog;
pub mod form;
pub mod search_bar;
pub mod sidebar;
pub mod spinner;
pub mod toast;

pub use confirm_dialog::{ConfirmDialog, ConfirmResult};
pub use form::{FormAction, FormModal};
pub use search_bar::{highlight_matches, SearchBar, SearchEvent};
pub use spinner::Spinner;
pub use toast::{Toast, ToastManager, ToastType};
