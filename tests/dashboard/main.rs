mod autosave;
mod polling;
mod support;
mod toasts;
