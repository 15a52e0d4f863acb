/// User interface module
///
/// - What is shown and the transient preview handles (presenter.rs)
/// - The iced widget tree (view.rs)
/// - Native picker, save and alert dialogs (dialogs.rs)

pub mod dialogs;
pub mod presenter;
pub mod view;

pub use presenter::Presenter;
pub use view::view;
