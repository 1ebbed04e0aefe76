//! Baseline reference data written by the seed run.

pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";

pub const ADMIN_EMAIL: &str = "admin@example.com";
/// Published default; operators must rotate it after the first deployment.
pub const ADMIN_PASSWORD: &str = "Admin@123456";
pub const ADMIN_FIRST_NAME: &str = "System";
pub const ADMIN_LAST_NAME: &str = "Administrator";

pub const PASSWORD_HASH_COST: u32 = 12;

pub struct RoleSeed {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

pub const ROLES: [RoleSeed; 2] = [
    RoleSeed {
        name: ADMIN_ROLE,
        display_name: "Administrator",
        description: "Full access to every dashboard feature",
    },
    RoleSeed {
        name: USER_ROLE,
        display_name: "User",
        description: "Standard account with access to its own profile",
    },
];

/// `(name, description)` pairs.
pub const PERMISSIONS: [(&str, &str); 9] = [
    ("users.read", "View users"),
    ("users.write", "Create and edit users"),
    ("users.delete", "Delete users"),
    ("roles.read", "View roles"),
    ("roles.write", "Create and edit roles"),
    ("roles.delete", "Delete roles"),
    ("settings.read", "View application settings"),
    ("settings.write", "Change application settings"),
    ("plugins.manage", "Install, configure and remove plugins"),
];

pub const SETTING_MAX_UPLOAD_SIZE: &str = "upload.max_size";
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

pub struct SettingSeed {
    pub key: &'static str,
    pub value: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

pub const SETTINGS: [SettingSeed; 4] = [
    SettingSeed {
        key: "app.name",
        value: "Admin Dashboard",
        description: "Application name shown in the header",
        category: "general",
    },
    SettingSeed {
        key: "app.version",
        value: "1.0.0",
        description: "Application version",
        category: "general",
    },
    SettingSeed {
        key: "session.timeout",
        value: "3600",
        description: "Session timeout in seconds",
        category: "security",
    },
    SettingSeed {
        key: SETTING_MAX_UPLOAD_SIZE,
        value: "5242880",
        description: "Maximum upload size in bytes",
        category: "uploads",
    },
];
