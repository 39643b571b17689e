pub mod controls;
pub mod log_view;
pub mod status_light;

pub use controls::{Controls, ControlsAction, STOP_LABEL};
pub use log_view::LogView;
pub use status_light::{phase_label, StatusLight};
