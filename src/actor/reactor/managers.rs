pub mod focus_guard;
