pub mod activity;
pub mod dashboard;
pub mod profile;
pub mod role;
pub mod settings;
pub mod user;

pub use activity::*;
pub use dashboard::*;
pub use profile::*;
pub use role::*;
pub use settings::*;
pub use user::*;
