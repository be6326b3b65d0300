pub mod command_line;
pub mod empty_state;
pub mod help_bar;
pub mod help_popup;
pub mod loading_indicator;
pub mod logs_popup;
pub mod popup;
pub mod screen_title;
pub mod toasts;
