pub mod renderer;
pub mod runtime;
pub mod state;

pub use renderer::{DashboardRenderer, NoopRenderer, TracingRenderer};
pub use runtime::{DashboardController, DashboardPorts, DashboardSettings};
pub use state::{ACTIVITY_LIMIT, ActivityEntry, DashboardSnapshot};
